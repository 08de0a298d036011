//! Load → chunk → embed → persist.

use std::path::Path;

use tracing::{info, warn};

use crate::chunking::chunk_document;
use crate::embeddings::EmbeddingsClient;
use crate::ingestion::loader::load_document;
use crate::stores::SegmentStore;
use crate::types::HavrutaError;

/// Outcome of a directory ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub files_ingested: usize,
    pub segments_stored: usize,
    /// Filename and error for each file that could not be ingested.
    pub failures: Vec<(String, String)>,
}

/// Runs the full ingestion path against one store.
pub struct IngestionPipeline<S> {
    embeddings: EmbeddingsClient,
    store: S,
}

impl<S: SegmentStore> IngestionPipeline<S> {
    pub fn new(embeddings: EmbeddingsClient, store: S) -> Self {
        Self { embeddings, store }
    }

    /// Ingests one export file, returning how many segments were stored.
    pub async fn ingest_file(&self, path: impl AsRef<Path>) -> Result<usize, HavrutaError> {
        let path = path.as_ref();
        let (doc, category) = load_document(path).await?;
        let segments = chunk_document(&doc, category);
        if segments.is_empty() {
            info!(title = %doc.title, "document produced no segments");
            return Ok(0);
        }

        let texts: Vec<String> = segments.iter().map(|s| s.content.clone()).collect();
        let vectors = self.embeddings.embed_batch(&texts).await?;

        let stored = segments.len();
        self.store
            .insert_segments(segments.into_iter().zip(vectors).collect())
            .await?;
        info!(title = %doc.title, %category, stored, "ingested file");
        Ok(stored)
    }

    /// Ingests every `.json` file in `dir`. A failing file is reported and
    /// skipped; the run continues with the rest.
    pub async fn ingest_directory(
        &self,
        dir: impl AsRef<Path>,
    ) -> Result<IngestReport, HavrutaError> {
        let mut report = IngestReport::default();
        let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.ingest_file(&path).await {
                Ok(stored) => {
                    report.files_ingested += 1;
                    report.segments_stored += stored;
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "skipping file");
                    report.failures.push((name, err.to_string()));
                }
            }
        }

        info!(
            files = report.files_ingested,
            segments = report.segments_stored,
            failures = report.failures.len(),
            "ingestion run finished"
        );
        Ok(report)
    }
}
