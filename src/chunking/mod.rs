//! Segmentation of normalized source documents into retrieval units.
//!
//! Dispatch is by [`SourceCategory`]: Torah and Mishnah are addressed by
//! chapter and fragment index, Talmud accumulates folio lines between
//! rhetorical boundaries. All of it is pure, synchronous, and infallible:
//! a document with nothing usable in it chunks to an empty vector.

pub mod analysis;
pub mod boundary;
pub mod clean;
pub mod document;
pub mod patterns;
pub mod segment;
mod strategies;

pub use boundary::{MAX_SEGMENT_CHARS, MIN_SEGMENT_CHARS};
pub use document::{RawDocument, SourceDocument, TextNode};
pub use segment::{InterpretiveLayer, Segment, SegmentAttributes};

use crate::types::{ChunkingError, SourceCategory};

/// Chunks a normalized document with the strategy for its category.
pub fn chunk_document(doc: &SourceDocument, category: SourceCategory) -> Vec<Segment> {
    match category {
        SourceCategory::Torah => strategies::chunk_by_verse(doc),
        SourceCategory::Mishnah => strategies::chunk_by_unit(doc),
        SourceCategory::Talmud => strategies::chunk_by_folio(doc),
    }
}

/// Chunks a document given a textual category label.
///
/// Fails with [`ChunkingError::InvalidCategory`] before any segmentation work
/// when the label is not a known category.
pub fn chunk_with_label(doc: &SourceDocument, label: &str) -> Result<Vec<Segment>, ChunkingError> {
    let category: SourceCategory = label.parse()?;
    Ok(chunk_document(doc, category))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_unit_doc(fragment: &str) -> SourceDocument {
        SourceDocument::from_units("Test", vec![vec![fragment.to_string()]], Vec::new())
    }

    #[test]
    fn dispatch_matches_category() {
        let doc = one_unit_doc("some text");
        let torah = chunk_document(&doc, SourceCategory::Torah);
        assert_eq!(torah[0].reference, "Test 1:1");
        let talmud = chunk_document(&doc, SourceCategory::Talmud);
        assert_eq!(talmud[0].reference, "Test 2a:0-0");
    }

    #[test]
    fn label_dispatch_accepts_known_categories() {
        let doc = one_unit_doc("some text");
        for label in ["Torah", "Mishnah", "Talmud"] {
            assert!(!chunk_with_label(&doc, label).unwrap().is_empty());
        }
    }

    #[test]
    fn unknown_label_is_rejected_before_chunking() {
        let doc = one_unit_doc("some text");
        let err = chunk_with_label(&doc, "Unknown").unwrap_err();
        assert_eq!(err, ChunkingError::InvalidCategory("Unknown".to_string()));
    }
}
