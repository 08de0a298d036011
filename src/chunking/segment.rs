//! The retrieval unit emitted by chunking.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::SourceCategory;

/// Heuristic reading-mode tag for a fragment.
///
/// Assigned by keyword presence ([`crate::chunking::analysis::classify_layer`])
/// and therefore approximate; `Peshat` is the default when no marker appears.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpretiveLayer {
    /// Plain-sense reading.
    #[default]
    Peshat,
    /// Intertextual allusion.
    Remez,
    /// Homiletical exposition.
    Drash,
}

/// Category-dependent structured metadata attached to a [`Segment`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentAttributes {
    /// 1-based chapter number (verse- and unit-addressed strategies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<usize>,
    /// 1-based verse or mishnah label within the chapter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse_or_unit: Option<String>,
    /// Folio-page label such as `2a` (page-accumulated strategy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folio: Option<String>,
    /// First accumulated line index within the folio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_start: Option<usize>,
    /// Last accumulated line index within the folio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_end: Option<usize>,
    /// Attributed speakers, de-duplicated, in first-occurrence order.
    pub speakers: Vec<String>,
    /// Short label derived from the first sentence.
    pub topic: String,
    pub layer: InterpretiveLayer,
}

/// A citably-addressed retrieval unit.
///
/// Created in-memory by a chunking strategy and immutable once emitted;
/// ownership passes to the embedding/persistence collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Process-unique identifier with no semantic meaning.
    pub id: String,
    /// Display/embedding text: the primary script when non-empty, otherwise
    /// the secondary script.
    pub content: String,
    /// Cleaned primary-script text.
    pub primary_content: String,
    /// Cleaned secondary-script text, when present and kept separate.
    pub secondary_content: Option<String>,
    pub category: SourceCategory,
    /// Human-readable citation, e.g. `Genesis 1:1` or `Berakhot 2a:0-14`.
    pub reference: String,
    pub attributes: SegmentAttributes,
}

impl Segment {
    /// Builds a segment with a fresh id, choosing `content` from the scripts.
    ///
    /// Callers must ensure at least one script is non-empty; strategies skip
    /// fragments where both clean to nothing.
    pub(crate) fn new(
        primary_content: String,
        secondary_content: Option<String>,
        category: SourceCategory,
        reference: String,
        attributes: SegmentAttributes,
    ) -> Self {
        let content = if primary_content.is_empty() {
            secondary_content.clone().unwrap_or_default()
        } else {
            primary_content.clone()
        };
        Self {
            id: Uuid::new_v4().to_string(),
            content,
            primary_content,
            secondary_content,
            category,
            reference,
            attributes,
        }
    }
}
