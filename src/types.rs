//! Shared error taxonomy and source categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced by the chunking core.
///
/// The core raises only for an unrecognized category at dispatch; every other
/// degenerate input (empty documents, blank fragments, missing secondary
/// script) is normal control flow with a well-defined empty outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkingError {
    /// The requested category label does not name a known chunking strategy.
    #[error("unknown source category '{0}'")]
    InvalidCategory(String),
}

/// Errors surfaced by the async collaborators around the chunking core.
#[derive(Debug, thiserror::Error)]
pub enum HavrutaError {
    #[error("chunking failed: {0}")]
    Chunking(#[from] ChunkingError),

    /// Malformed or unreadable export document.
    #[error("invalid document: {0}")]
    Document(String),

    /// The embeddings endpoint returned an unusable response.
    #[error("embedding request failed: {0}")]
    Embedding(String),

    /// A vector's dimension does not match what the store was opened with.
    #[error("embedding dimension mismatch: got {got}, store expects {expected}")]
    DimensionMismatch { got: usize, expected: usize },

    /// The chat-completion endpoint returned an unusable response.
    #[error("completion request failed: {0}")]
    Completion(String),

    /// A corpus download could not be completed.
    #[error("download failed: {0}")]
    Download(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The three fixed source categories, each governing a chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    /// Scripture, addressed chapter:verse.
    Torah,
    /// Codified legal units, addressed chapter:mishnah.
    Mishnah,
    /// Folio-paginated discursive text, accumulated into sugya-sized segments.
    Talmud,
}

impl SourceCategory {
    /// Stable label used in references, storage rows, and dispatch.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Torah => "Torah",
            Self::Mishnah => "Mishnah",
            Self::Talmud => "Talmud",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceCategory {
    type Err = ChunkingError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "Torah" => Ok(Self::Torah),
            "Mishnah" => Ok(Self::Mishnah),
            "Talmud" => Ok(Self::Talmud),
            other => Err(ChunkingError::InvalidCategory(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels_round_trip() {
        for category in [
            SourceCategory::Torah,
            SourceCategory::Mishnah,
            SourceCategory::Talmud,
        ] {
            assert_eq!(category.as_str().parse::<SourceCategory>(), Ok(category));
        }
    }

    #[test]
    fn unknown_label_is_invalid_category() {
        let err = "Unknown".parse::<SourceCategory>().unwrap_err();
        assert_eq!(err, ChunkingError::InvalidCategory("Unknown".to_string()));
    }
}
