//! OpenAI-compatible embeddings client.
//!
//! Talks to a local or remote `/embeddings` endpoint (LM Studio, OpenRouter,
//! anything wire-compatible). Batching is sequential: segments arrive in
//! document order and the store receives them in the same order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbeddingsConfig;
use crate::types::HavrutaError;

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingRow>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingRow {
    index: usize,
    embedding: Vec<f32>,
}

/// Client for an OpenAI-compatible `/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingsClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    batch_size: usize,
}

impl EmbeddingsClient {
    pub fn new(config: &EmbeddingsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            batch_size: config.batch_size.max(1),
        }
    }

    /// Embeds a single text.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, HavrutaError> {
        let mut vectors = self.request(std::slice::from_ref(&text.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| HavrutaError::Embedding("endpoint returned no vectors".into()))
    }

    /// Embeds many texts, issuing sequential requests of at most the
    /// configured batch size. The result aligns index-for-index with `texts`.
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, HavrutaError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let mut batch_vectors = self.request(batch).await?;
            debug!(
                batch_len = batch.len(),
                total = vectors.len() + batch_vectors.len(),
                "embedded batch"
            );
            vectors.append(&mut batch_vectors);
        }
        Ok(vectors)
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, HavrutaError> {
        let body = EmbeddingsRequest {
            model: &self.model,
            input,
        };
        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(HavrutaError::Embedding(format!(
                "endpoint returned {}",
                response.status()
            )));
        }

        let mut parsed: EmbeddingsResponse = response.json().await?;
        if parsed.data.len() != input.len() {
            return Err(HavrutaError::Embedding(format!(
                "requested {} vectors, got {}",
                input.len(),
                parsed.data.len()
            )));
        }
        // Wire order is not guaranteed; the index field is.
        parsed.data.sort_by_key(|row| row.index);
        Ok(parsed.data.into_iter().map(|row| row.embedding).collect())
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero-norm input.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn client(base_url: &str, batch_size: usize) -> EmbeddingsClient {
        EmbeddingsClient::new(&EmbeddingsConfig {
            base_url: base_url.to_string(),
            model: "test-embedder".to_string(),
            dimension: 3,
            batch_size,
        })
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.5, 0.25, 0.75];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_guards_degenerate_input() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[tokio::test]
    async fn embed_returns_single_vector() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}]
            }));
        });

        let vector = client(&server.url("/v1"), 10).embed("hello").await.unwrap();
        mock.assert();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn embed_batch_splits_by_batch_size() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [
                    {"index": 0, "embedding": [1.0, 0.0]},
                    {"index": 1, "embedding": [0.0, 1.0]}
                ]
            }));
        });

        let texts: Vec<String> = (0..4).map(|i| format!("text {i}")).collect();
        let vectors = client(&server.url("/v1"), 2)
            .embed_batch(&texts)
            .await
            .unwrap();
        mock.assert_hits(2);
        assert_eq!(vectors.len(), 4);
    }

    #[tokio::test]
    async fn out_of_order_indices_are_realigned() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({
                "data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]
            }));
        });

        let texts = vec!["a".to_string(), "b".to_string()];
        let vectors = client(&server.url("/v1"), 10)
            .embed_batch(&texts)
            .await
            .unwrap();
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn error_status_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(500);
        });

        let err = client(&server.url("/v1"), 10).embed("boom").await.unwrap_err();
        assert!(matches!(err, HavrutaError::Embedding(_)));
    }

    #[tokio::test]
    async fn vector_count_mismatch_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/embeddings");
            then.status(200).json_body(json!({"data": []}));
        });

        let err = client(&server.url("/v1"), 10).embed("lost").await.unwrap_err();
        assert!(matches!(err, HavrutaError::Embedding(_)));
    }
}
