//! Corpus acquisition and the file-to-store ingestion pipeline.
//!
//! [`download`] fetches export JSON from the Sefaria-Export repository into a
//! local data directory; [`loader`] decodes one file into a normalized
//! document with its inferred category; [`pipeline`] runs load → chunk →
//! embed → persist over a file or a whole directory.

pub mod download;
pub mod loader;
pub mod pipeline;

pub use download::{download_corpus, download_targets, DownloadSummary, DownloadTarget};
pub use loader::{category_from_filename, load_document};
pub use pipeline::{IngestReport, IngestionPipeline};
