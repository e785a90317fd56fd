//! Configuration management for RAGBot.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - `<workspace>/.env` (loaded into the process environment)
//! - YAML config file (`.ragbot/config.yaml` or an explicit path)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Chat providers the binary knows how to construct.
pub const KNOWN_PROVIDERS: [&str; 2] = ["openrouter", "ollama"];

/// Embedding providers the binary knows how to construct.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 2] = ["trigram", "ollama"];

const DEFAULT_PROVIDER: &str = "openrouter";
const DEFAULT_MODEL: &str = "meta-llama/llama-3.2-3b-instruct";
const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .ragbot/ and the FAQ data)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Chat provider ("openrouter" or "ollama")
    pub provider: String,

    /// Chat model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Explicit API key (RAGBOT_API_KEY)
    pub api_key: Option<String>,

    /// Environment variable the provider API key is read from
    pub api_key_env: String,

    /// Maximum tokens to generate per answer
    pub max_tokens: Option<u32>,

    /// Sampling temperature
    pub temperature: Option<f32>,

    /// Embedding settings for the FAQ index
    pub embedding: EmbeddingSettings,

    /// QA workflow tuning
    pub workflow: WorkflowSettings,

    /// FAQ data directory (relative paths resolve against the workspace)
    pub data_path: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Embedding provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Provider name ("trigram" or "ollama")
    pub provider: String,

    /// Model identifier (ignored by the trigram provider)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Custom endpoint for remote providers
    pub endpoint: Option<String>,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            endpoint: None,
        }
    }
}

/// Settings for the question-answering workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSettings {
    /// Number of passages retrieved per question
    pub top_k: usize,

    /// Minimum similarity score a passage needs to be used as context
    pub similarity_cutoff: f32,

    /// Budget for retrieval, filtering and stream initiation
    pub timeout_secs: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            similarity_cutoff: 0.85,
            timeout_secs: 120,
        }
    }
}

impl WorkflowSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    embedding: Option<EmbeddingSection>,
    workflow: Option<WorkflowSection>,
    data: Option<DataSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "maxTokens")]
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmbeddingSection {
    provider: Option<String>,
    model: Option<String>,
    dimensions: Option<usize>,
    endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkflowSection {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "similarityCutoff")]
    similarity_cutoff: Option<f32>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DataSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

/// Command-line overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub data_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub verbose: bool,
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: None,
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            max_tokens: Some(1000),
            temperature: Some(0.1),
            embedding: EmbeddingSettings::default(),
            workflow: WorkflowSettings::default(),
            data_path: PathBuf::from("data"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration for a workspace.
    ///
    /// Environment variables:
    /// - `RAGBOT_PROVIDER`: Chat provider
    /// - `RAGBOT_MODEL`: Model identifier
    /// - `RAGBOT_API_KEY`: API key (otherwise read from `apiKeyEnv`)
    /// - `RAGBOT_ENDPOINT`: Provider endpoint
    /// - `RAGBOT_DATA`: FAQ data directory
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use ragbot_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }
        config.config_file = config_file;

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        load_env_file(&config.workspace.join(".env"))?;

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.ragbot_dir().join("config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        } else if config.config_file.is_some() {
            return Err(AppError::Config(format!(
                "Config file not found: {:?}",
                config_path
            )));
        }

        config.apply_env();

        Ok(config)
    }

    /// Environment variables override YAML config.
    fn apply_env(&mut self) {
        if let Ok(provider) = std::env::var("RAGBOT_PROVIDER") {
            self.provider = provider;
        }

        if let Ok(model) = std::env::var("RAGBOT_MODEL") {
            self.model = model;
        }

        if let Ok(endpoint) = std::env::var("RAGBOT_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }

        if let Ok(data) = std::env::var("RAGBOT_DATA") {
            self.data_path = PathBuf::from(data);
        }

        if let Ok(key) = std::env::var("RAGBOT_API_KEY") {
            self.api_key = Some(key);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            self.no_color = true;
        }
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        Ok(self.merged(file))
    }

    fn merged(&self, file: ConfigFile) -> Self {
        let mut result = self.clone();

        if let Some(llm) = file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env) = llm.api_key_env {
                result.api_key_env = env;
            }
            if llm.max_tokens.is_some() {
                result.max_tokens = llm.max_tokens;
            }
            if llm.temperature.is_some() {
                result.temperature = llm.temperature;
            }
        }

        if let Some(embedding) = file.embedding {
            if let Some(provider) = embedding.provider {
                result.embedding.provider = provider;
            }
            if let Some(model) = embedding.model {
                result.embedding.model = model;
            }
            if let Some(dimensions) = embedding.dimensions {
                result.embedding.dimensions = dimensions;
            }
            if embedding.endpoint.is_some() {
                result.embedding.endpoint = embedding.endpoint;
            }
        }

        if let Some(workflow) = file.workflow {
            if let Some(top_k) = workflow.top_k {
                result.workflow.top_k = top_k;
            }
            if let Some(cutoff) = workflow.similarity_cutoff {
                result.workflow.similarity_cutoff = cutoff;
            }
            if let Some(timeout) = workflow.timeout_secs {
                result.workflow.timeout_secs = timeout;
            }
        }

        if let Some(path) = file.data.and_then(|d| d.path) {
            result.data_path = PathBuf::from(path);
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        result
    }

    /// Apply CLI overrides to the configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(provider) = overrides.provider {
            self.provider = provider;
        }

        if let Some(model) = overrides.model {
            self.model = model;
        }

        if let Some(data_path) = overrides.data_path {
            self.data_path = data_path;
        }

        if let Some(log_level) = overrides.log_level {
            self.log_level = Some(log_level);
        }

        if overrides.verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if overrides.no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .ragbot directory.
    pub fn ragbot_dir(&self) -> PathBuf {
        self.workspace.join(".ragbot")
    }

    /// Directory holding optional prompt overrides.
    pub fn prompts_dir(&self) -> PathBuf {
        self.ragbot_dir().join("prompts")
    }

    /// FAQ data directory, resolved against the workspace.
    pub fn data_dir(&self) -> PathBuf {
        if self.data_path.is_absolute() {
            self.data_path.clone()
        } else {
            self.workspace.join(&self.data_path)
        }
    }

    /// Resolve the provider API key.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }

        std::env::var(&self.api_key_env).ok()
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.provider == "openrouter" && self.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key not found in environment variable: {}",
                self.api_key_env
            )));
        }

        if !KNOWN_EMBEDDING_PROVIDERS.contains(&self.embedding.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding.provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if self.embedding.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        let cutoff = self.workflow.similarity_cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(AppError::Config(format!(
                "similarityCutoff must be within [0, 1], got {}",
                cutoff
            )));
        }

        if self.workflow.top_k == 0 {
            return Err(AppError::Config("topK must be at least 1".to_string()));
        }

        if self.workflow.timeout_secs == 0 {
            return Err(AppError::Config(
                "timeoutSecs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load `KEY=value` pairs from a dotenv file if one exists.
///
/// Variables already present in the environment are left untouched.
fn load_env_file(path: &Path) -> AppResult<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(AppError::Config(format!(
            "Failed to load environment file {:?}: {}",
            path, e
        ))),
    }
}
