//! Question answering over the stored corpus.
//!
//! Retrieval first: the question is embedded, the nearest segments above the
//! similarity floor are pulled, and the chat-completion endpoint answers with
//! those passages inlined as numbered, citation-addressed context.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{LlmConfig, RetrievalConfig};
use crate::embeddings::EmbeddingsClient;
use crate::stores::{SearchHit, SegmentStore};
use crate::types::HavrutaError;

const SYSTEM_PROMPT: &str = "You are a havruta, a study companion for Torah, Mishnah, and \
Talmud. Ground every answer in the numbered source passages provided, cite them by their \
reference (for example, Berakhot 2a or Genesis 1:1), present multiple interpretations where \
the sources disagree, and say plainly when the passages do not settle the question. You are \
a study partner, not a halakhic decisor.";

const NO_SOURCES_ANSWER: &str =
    "I could not find relevant sources for that question. Please try rephrasing it.";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Retrieval-augmented study companion.
pub struct Assistant<S> {
    embeddings: EmbeddingsClient,
    store: S,
    http: reqwest::Client,
    llm: LlmConfig,
    retrieval: RetrievalConfig,
}

impl<S: SegmentStore> Assistant<S> {
    pub fn new(
        embeddings: EmbeddingsClient,
        store: S,
        llm: LlmConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            embeddings,
            store,
            http: reqwest::Client::new(),
            llm,
            retrieval,
        }
    }

    /// Embeds the question and returns the nearest stored segments.
    pub async fn search(&self, question: &str) -> Result<Vec<SearchHit>, HavrutaError> {
        let query = self.embeddings.embed(question).await?;
        let hits = self
            .store
            .search_similar(&query, self.retrieval.top_k, self.retrieval.min_similarity)
            .await?;
        for (rank, hit) in hits.iter().enumerate() {
            debug!(
                rank = rank + 1,
                similarity = hit.similarity,
                reference = %hit.segment.reference,
                "retrieved"
            );
        }
        info!(question, hits = hits.len(), "retrieval complete");
        Ok(hits)
    }

    /// Answers a question from the stored corpus.
    ///
    /// With no passages above the similarity floor this returns a fixed
    /// please-rephrase answer rather than asking the model to speculate.
    pub async fn answer(&self, question: &str) -> Result<String, HavrutaError> {
        let hits = self.search(question).await?;
        if hits.is_empty() {
            return Ok(NO_SOURCES_ANSWER.to_string());
        }
        let context = context_block(&hits);
        let user_turn = format!(
            "Using the following source passages, please answer: {question}\n\n{context}"
        );
        self.complete(&user_turn).await
    }

    async fn complete(&self, user_turn: &str) -> Result<String, HavrutaError> {
        let body = CompletionRequest {
            model: &self.llm.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_turn,
                },
            ],
            temperature: self.llm.temperature,
        };

        let endpoint = format!(
            "{}/chat/completions",
            self.llm.base_url.trim_end_matches('/')
        );
        let mut request = self.http.post(&endpoint).json(&body);
        if !self.llm.api_key.is_empty() {
            request = request.bearer_auth(&self.llm.api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(HavrutaError::Completion(format!(
                "endpoint returned {}",
                response.status()
            )));
        }
        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| HavrutaError::Completion("endpoint returned no content".into()))
    }
}

/// Formats retrieved passages as a numbered context block,
/// `[1] Talmud Berakhot 2a:0-14: ...` per line.
fn context_block(hits: &[SearchHit]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "[{}] {} {}: {}",
                i + 1,
                hit.segment.category,
                hit.segment.reference,
                hit.segment.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
