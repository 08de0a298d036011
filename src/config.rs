//! Environment-driven configuration.
//!
//! All tunables live in one explicit [`Config`] value that the caller threads
//! into the collaborators that need it; nothing in this crate reads the
//! environment after startup or holds module-level state.

use std::path::PathBuf;

/// Embeddings endpoint settings (OpenAI-compatible, e.g. LM Studio).
#[derive(Debug, Clone)]
pub struct EmbeddingsConfig {
    /// Base URL including the API version segment, e.g. `http://127.0.0.1:1338/v1`.
    pub base_url: String,
    pub model: String,
    /// Expected vector dimension; inserts with a different dimension fail.
    pub dimension: usize,
    /// Number of texts per embeddings request.
    pub batch_size: usize,
}

/// Chat-completion endpoint settings.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
}

/// Retrieval tunables for the answer pipeline.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub min_similarity: f32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    /// Directory holding downloaded export JSON files.
    pub data_dir: PathBuf,
    /// Path of the sqlite-vec database file.
    pub store_path: PathBuf,
}

impl Config {
    /// Loads configuration from the environment, reading `.env` first when
    /// present. Every field has a workable local default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            embeddings: EmbeddingsConfig {
                base_url: env_or("EMBEDDING_URL", "http://127.0.0.1:1338/v1"),
                model: env_or("EMBEDDING_MODEL", "text-embedding-bge-m3"),
                dimension: env_parse_or("EMBEDDING_DIMENSION", 768),
                batch_size: env_parse_or("EMBEDDING_BATCH_SIZE", 10),
            },
            llm: LlmConfig {
                base_url: env_or("LLM_API_URL", "https://openrouter.ai/api/v1"),
                api_key: env_or("LLM_API_KEY", ""),
                model: env_or("LLM_MODEL", "openrouter/pony-alpha"),
                temperature: env_parse_or("LLM_TEMPERATURE", 0.7),
            },
            retrieval: RetrievalConfig {
                top_k: env_parse_or("RETRIEVAL_TOP_K", 20),
                min_similarity: env_parse_or("RETRIEVAL_MIN_SIMILARITY", 0.2),
            },
            data_dir: PathBuf::from(env_or("DATA_DIR", "data/raw")),
            store_path: PathBuf::from(env_or("STORE_PATH", "data/havruta.db")),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_populated() {
        let config = Config::from_env();
        assert!(!config.embeddings.model.is_empty());
        assert!(config.embeddings.batch_size > 0);
        assert!(config.retrieval.top_k > 0);
    }
}
