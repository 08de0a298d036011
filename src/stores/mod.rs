//! Persistence for embedded segments.
//!
//! The [`SegmentStore`] trait is the seam between the ingestion pipeline and
//! whatever holds the vectors; [`SqliteSegmentStore`] is the shipped backend,
//! a single sqlite-vec database file.

pub mod sqlite;

pub use sqlite::SqliteSegmentStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chunking::{Segment, SegmentAttributes};
use crate::types::{HavrutaError, SourceCategory};

/// A segment as persisted: the citation fields plus structured attributes,
/// without the script split (the store keeps only the retrieval text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSegment {
    pub id: String,
    pub category: SourceCategory,
    pub reference: String,
    pub content: String,
    pub attributes: SegmentAttributes,
}

impl From<Segment> for StoredSegment {
    fn from(segment: Segment) -> Self {
        Self {
            id: segment.id,
            category: segment.category,
            reference: segment.reference,
            content: segment.content,
            attributes: segment.attributes,
        }
    }
}

/// One retrieval result, best-first.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub segment: StoredSegment,
    /// Cosine similarity against the query vector, in `[-1.0, 1.0]`.
    pub similarity: f32,
}

/// Vector-backed segment persistence.
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// Persists segments with their embeddings. Empty input is a no-op.
    async fn insert_segments(
        &self,
        segments: Vec<(Segment, Vec<f32>)>,
    ) -> Result<(), HavrutaError>;

    /// Returns up to `top_k` segments whose embedding's cosine similarity to
    /// `query` is at least `min_similarity`, ordered best-first.
    async fn search_similar(
        &self,
        query: &[f32],
        top_k: usize,
        min_similarity: f32,
    ) -> Result<Vec<SearchHit>, HavrutaError>;

    /// Number of persisted segments.
    async fn count(&self) -> Result<usize, HavrutaError>;
}
