//! Decoding one export JSON file into a normalized document.

use std::path::Path;

use tracing::debug;

use crate::chunking::{RawDocument, SourceDocument};
use crate::types::{HavrutaError, SourceCategory};

const TORAH_BOOKS: &[&str] = &["genesis", "exodus", "leviticus", "numbers", "deuteronomy"];

/// Infers the source category from a downloaded file's name.
///
/// Torah book names win first, then the `Mishnah_` filename prefix the
/// downloader assigns; everything else in the data directory is a Talmud
/// tractate, so Talmud is the fallback rather than an error.
pub fn category_from_filename(filename: &str) -> SourceCategory {
    let lower = filename.to_lowercase();
    if TORAH_BOOKS.iter().any(|book| lower.contains(book)) {
        SourceCategory::Torah
    } else if lower.contains("mishnah") {
        SourceCategory::Mishnah
    } else {
        SourceCategory::Talmud
    }
}

/// Reads and normalizes one export JSON file.
pub async fn load_document(
    path: impl AsRef<Path>,
) -> Result<(SourceDocument, SourceCategory), HavrutaError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let raw: RawDocument = serde_json::from_slice(&bytes)
        .map_err(|err| HavrutaError::Document(format!("{}: {err}", path.display())))?;

    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    let category = category_from_filename(stem);

    let doc = SourceDocument::normalize(raw);
    debug!(
        title = %doc.title,
        %category,
        units = doc.units().len(),
        "loaded document"
    );
    Ok((doc, category))
}
