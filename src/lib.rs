//! ```text
//! Sefaria export JSON ──► ingestion::loader ──► SourceDocument
//!                                                   │
//!                                 chunking::chunk_document (per category)
//!                                                   │
//!                        ┌── verse-addressed (Torah) ┤
//!                        ├── unit-addressed (Mishnah) ┤──► Vec<Segment>
//!                        └── folio-accumulated (Talmud) ┘
//!                                                   │
//! Segments ──► embeddings::EmbeddingsClient ──► stores::SqliteSegmentStore
//!                                                   │
//! Question ──► assistant::Assistant ──► retrieval + chat completion ──► answer
//! ```
//!
//! # havruta
//!
//! A retrieval-augmented study companion over Torah, Mishnah, and Talmud.
//!
//! The heart of the crate is the [`chunking`] module: it turns the
//! heterogeneous, nested, bilingual Sefaria export shapes into citable
//! retrieval units ([`chunking::Segment`]) with derived metadata: speaker
//! attribution, topic hints, and interpretive-layer tags. Chunking is pure and
//! synchronous; everything async (downloads, embeddings, storage, generation)
//! lives in the surrounding modules and receives its configuration explicitly.

pub mod assistant;
pub mod chunking;
pub mod config;
pub mod embeddings;
pub mod ingestion;
pub mod stores;
pub mod types;

pub use chunking::{chunk_document, chunk_with_label, Segment, SourceDocument};
pub use types::{ChunkingError, HavrutaError, SourceCategory};
