//! FAQ corpus reading.
//!
//! A corpus is a directory of JSON files, each holding an array of
//! `{ "questions": [..], "answer": ".." }` entries. Every question phrasing
//! becomes its own document carrying the shared answer.

use crate::types::{FaqDocument, FaqEntry};
use ragbot_core::{AppError, AppResult};
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

/// Normalize text for indexing: NFKD, lowercase, collapse whitespace runs.
pub fn clean_text(text: &str) -> String {
    let decomposed: String = text.nfkd().collect();
    decomposed
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Read one FAQ JSON file into documents.
pub fn read_faq_file(path: &Path) -> AppResult<Vec<FaqDocument>> {
    if !is_json_file(path) {
        return Err(AppError::Knowledge(format!(
            "Not a JSON file: {:?}",
            path
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))?;

    let entries: Vec<FaqEntry> = serde_json::from_str(&raw)
        .map_err(|e| AppError::Knowledge(format!("Failed to parse {:?}: {}", path, e)))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut documents = Vec::new();
    for (entry_idx, entry) in entries.iter().enumerate() {
        for (question_idx, question) in entry.questions.iter().enumerate() {
            let text = clean_text(question);
            if text.is_empty() {
                continue;
            }

            documents.push(FaqDocument {
                id: format!("{}:{}:{}", stem, entry_idx, question_idx),
                text,
                answer: entry.answer.clone(),
            });
        }
    }

    tracing::debug!(
        "Read {} entries ({} questions) from {:?}",
        entries.len(),
        documents.len(),
        path
    );

    Ok(documents)
}

/// Read every `*.json` file under `dir`, in file-name order.
pub fn read_faq_dir(dir: &Path) -> AppResult<Vec<FaqDocument>> {
    if !dir.is_dir() {
        return Err(AppError::Knowledge(format!(
            "FAQ data directory not found: {:?}",
            dir
        )));
    }

    let mut documents = Vec::new();
    let mut files = 0usize;

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_json_file(path) {
            documents.extend(read_faq_file(path)?);
            files += 1;
        }
    }

    tracing::info!(
        "Loaded {} FAQ documents from {} files in {:?}",
        documents.len(),
        files,
        dir
    );

    Ok(documents)
}
