//! In-memory vector index over FAQ documents.

use crate::embeddings::EmbeddingProvider;
use crate::retriever::Retriever;
use crate::types::{FaqDocument, PassageSet, ScoredPassage};
use ragbot_core::{AppError, AppResult};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct IndexedDocument {
    document: FaqDocument,
    embedding: Vec<f32>,
}

/// Brute-force cosine index, built once at startup and read-only afterwards.
#[derive(Debug)]
pub struct FaqIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: Vec<IndexedDocument>,
}

impl FaqIndex {
    /// Embed every document with `embedder` and index the result.
    pub async fn build(
        documents: Vec<FaqDocument>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let texts: Vec<String> = documents.iter().map(|d| d.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != documents.len() {
            return Err(AppError::Knowledge(format!(
                "Embedding provider returned {} vectors for {} documents",
                embeddings.len(),
                documents.len()
            )));
        }

        let dimensions = embedder.dimensions();
        let entries = documents
            .into_iter()
            .zip(embeddings)
            .map(|(document, embedding)| {
                if embedding.len() != dimensions {
                    return Err(AppError::Knowledge(format!(
                        "Embedding for '{}' has {} dimensions, expected {}",
                        document.id,
                        embedding.len(),
                        dimensions
                    )));
                }
                Ok(IndexedDocument {
                    document,
                    embedding,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::info!(
            "Built FAQ index: {} documents, {} dimensions ({} / {})",
            entries.len(),
            dimensions,
            embedder.provider_name(),
            embedder.model_name()
        );

        Ok(Self { embedder, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank documents against a query vector and keep the best `top_k`.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<PassageSet> {
        let dimensions = self.embedder.dimensions();
        if query_embedding.len() != dimensions {
            return Err(AppError::Retrieval(format!(
                "Query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                dimensions
            )));
        }

        let mut results: Vec<(&IndexedDocument, f32)> = self
            .entries
            .iter()
            .map(|entry| (entry, relevance(query_embedding, &entry.embedding)))
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        tracing::debug!(
            "Retrieved {} passages (requested top-{}) - scores: {:?}",
            results.len(),
            top_k,
            results.iter().map(|(_, s)| *s).collect::<Vec<_>>()
        );

        Ok(results
            .into_iter()
            .map(|(entry, score)| {
                ScoredPassage::new(
                    entry.document.id.clone(),
                    entry.document.text.clone(),
                    entry.document.answer.clone(),
                    score,
                )
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl Retriever for FaqIndex {
    async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<PassageSet> {
        let query_embedding = self
            .embedder
            .embed_query(question)
            .await
            .map_err(AppError::into_retrieval)?;

        self.search(&query_embedding, top_k)
    }
}

/// Cosine similarity clamped to [0, 1].
fn relevance(a: &[f32], b: &[f32]) -> f32 {
    cosine_similarity(a, b).clamp(0.0, 1.0)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{OllamaEmbeddingProvider, TrigramProvider};
    use ragbot_core::EmbeddingSettings;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Embeds texts by looking them up in a fixed table.
    #[derive(Debug)]
    struct TableEmbedder {
        table: Vec<(&'static str, Vec<f32>)>,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for TableEmbedder {
        fn provider_name(&self) -> &str {
            "table"
        }

        fn model_name(&self) -> &str {
            "table"
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            texts
                .iter()
                .map(|t| {
                    self.table
                        .iter()
                        .find(|(k, _)| k == t)
                        .map(|(_, v)| v.clone())
                        .ok_or_else(|| AppError::Knowledge(format!("no vector for {}", t)))
                })
                .collect()
        }
    }

    fn doc(id: &str, text: &str) -> FaqDocument {
        FaqDocument {
            id: id.to_string(),
            text: text.to_string(),
            answer: format!("answer to {}", text),
        }
    }

    fn table_index_embedder() -> Arc<dyn EmbeddingProvider> {
        Arc::new(TableEmbedder {
            table: vec![
                ("insulin", vec![1.0, 0.0, 0.0]),
                ("glucose", vec![0.8, 0.6, 0.0]),
                ("pasta", vec![-1.0, 0.0, 0.0]),
                ("query", vec![1.0, 0.0, 0.0]),
            ],
        })
    }

    #[tokio::test]
    async fn test_ranks_by_descending_score() {
        let index = FaqIndex::build(
            vec![doc("1", "pasta"), doc("2", "glucose"), doc("3", "insulin")],
            table_index_embedder(),
        )
        .await
        .unwrap();

        let passages = index.retrieve("query", 5).await.unwrap();
        let ids: Vec<_> = passages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);

        let scores: Vec<_> = passages.iter().map(|p| p.score).collect();
        assert!((scores[0] - 1.0).abs() < 1e-6);
        assert!((scores[1] - 0.8).abs() < 1e-6);
        // Opposite vectors clamp to zero
        assert_eq!(scores[2], 0.0);
        assert_eq!(passages.as_slice()[0].answer, "answer to insulin");
    }

    #[tokio::test]
    async fn test_truncates_to_top_k() {
        let index = FaqIndex::build(
            vec![doc("1", "pasta"), doc("2", "glucose"), doc("3", "insulin")],
            table_index_embedder(),
        )
        .await
        .unwrap();

        assert_eq!(index.retrieve("query", 2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_set() {
        let index = FaqIndex::build(Vec::new(), Arc::new(TrigramProvider::new(64)))
            .await
            .unwrap();
        assert!(index.is_empty());
        assert!(index.retrieve("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_retrieval_error() {
        let index = FaqIndex::build(vec![doc("1", "insulin")], table_index_embedder())
            .await
            .unwrap();
        let result = index.search(&[1.0, 0.0], 5);
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_retrieval_error() {
        let index = FaqIndex::build(vec![doc("1", "insulin")], table_index_embedder())
            .await
            .unwrap();
        let result = index.retrieve("unknown text", 5).await;
        assert!(matches!(result, Err(AppError::Retrieval(_))));
    }

    #[tokio::test]
    async fn test_trigram_exact_question_scores_one() {
        let index = FaqIndex::build(
            vec![
                doc("1", "what is type 1 diabetes?"),
                doc("2", "how do i store insulin?"),
            ],
            Arc::new(TrigramProvider::new(384)),
        )
        .await
        .unwrap();

        let passages = index.retrieve("What is Type 1 diabetes?", 5).await.unwrap();
        assert_eq!(passages.as_slice()[0].id, "1");
        assert!(passages.as_slice()[0].score > 0.99);
    }

    /// Local HTTP server that answers every request with a 500 and counts them.
    async fn failing_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 4096];
                    loop {
                        let n = match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => n,
                        };
                        request.extend_from_slice(&buf[..n]);
                        if request_complete(&request) {
                            break;
                        }
                    }
                    counter.fetch_add(1, Ordering::SeqCst);

                    let body = r#"{"error":"model crashed"}"#;
                    let response = format!(
                        "HTTP/1.1 500 Internal Server Error\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}", addr), hits)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    #[tokio::test]
    async fn test_failed_question_embedding_is_not_retried() {
        let (endpoint, hits) = failing_server().await;
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 3,
            endpoint: Some(endpoint),
        };
        let embedder = OllamaEmbeddingProvider::new(&settings).unwrap();

        // Empty corpus: building the index sends nothing to the server
        let index = FaqIndex::build(Vec::new(), Arc::new(embedder)).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        let result = index.retrieve("what is insulin?", 5).await;
        match result {
            Err(AppError::Retrieval(msg)) => assert!(msg.contains("model crashed")),
            other => panic!("expected retrieval error, got {:?}", other),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.001);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(relevance(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
    }
}
