//! Source document model and structural normalization.
//!
//! The Sefaria export stores a work's text as a nested array whose depth is
//! not consistent across works: most files are `[[fragment, ...], ...]`
//! (outer unit → fragments), some are a flat `[fragment, ...]` (a single
//! chapter), and an individual fragment may itself be an array of
//! sub-fragments. [`RawDocument`] models that ambiguity once, as an untagged
//! tree, and [`SourceDocument::normalize`] resolves it into the one canonical
//! shape the chunking strategies consume: ordered outer units of ordered
//! string fragments, with the secondary (Hebrew) script aligned by the same
//! `(unit, fragment)` indices.

use serde::Deserialize;

/// One node of the export's irregularly nested text tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextNode {
    Leaf(String),
    Branch(Vec<TextNode>),
}

impl TextNode {
    /// Collapses this node into a single fragment string, joining nested
    /// leaves with spaces.
    fn into_fragment(self) -> String {
        match self {
            Self::Leaf(text) => text,
            Self::Branch(children) => {
                let parts: Vec<String> =
                    children.into_iter().map(TextNode::into_fragment).collect();
                parts.join(" ")
            }
        }
    }

    /// Splits this node into the fragments of one outer unit.
    fn into_unit(self) -> Vec<String> {
        match self {
            Self::Leaf(text) => vec![text],
            Self::Branch(children) => {
                children.into_iter().map(TextNode::into_fragment).collect()
            }
        }
    }
}

/// A work as decoded straight from an export JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDocument {
    pub title: String,
    #[serde(default)]
    pub text: Vec<TextNode>,
    /// Secondary-script text, structurally parallel to `text`.
    #[serde(default)]
    pub he: Option<Vec<TextNode>>,
}

/// A titled work in canonical two-level shape: outer units of string fragments.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub title: String,
    units: Vec<Vec<String>>,
    secondary_units: Vec<Vec<String>>,
}

impl SourceDocument {
    /// Resolves the raw tree into the canonical two-level shape.
    ///
    /// If the first element of `text` is itself a sequence, the document is
    /// already two-level and passes through. If it is a flat leaf, the whole
    /// of `text` (and `he`, when present) is promoted to a single outer unit.
    /// An empty `text` yields zero outer units; strategies then produce zero
    /// segments rather than failing.
    pub fn normalize(raw: RawDocument) -> Self {
        let two_level = matches!(raw.text.first(), Some(TextNode::Branch(_)));
        let secondary = raw.he.unwrap_or_default();

        let (units, secondary_units) = if two_level {
            (
                raw.text.into_iter().map(TextNode::into_unit).collect(),
                secondary.into_iter().map(TextNode::into_unit).collect(),
            )
        } else if raw.text.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let unit: Vec<String> =
                raw.text.into_iter().map(TextNode::into_fragment).collect();
            let secondary_unit: Vec<String> = secondary
                .into_iter()
                .map(TextNode::into_fragment)
                .collect();
            let secondary_units = if secondary_unit.is_empty() {
                Vec::new()
            } else {
                vec![secondary_unit]
            };
            (vec![unit], secondary_units)
        };

        Self {
            title: raw.title,
            units,
            secondary_units,
        }
    }

    /// Builds a document directly from canonical parts; mainly for tests and
    /// programmatic construction.
    pub fn from_units(
        title: impl Into<String>,
        units: Vec<Vec<String>>,
        secondary_units: Vec<Vec<String>>,
    ) -> Self {
        Self {
            title: title.into(),
            units,
            secondary_units,
        }
    }

    /// Ordered outer units of the primary script.
    pub fn units(&self) -> &[Vec<String>] {
        &self.units
    }

    /// Secondary-script fragment aligned at `(unit, fragment)`, if present.
    /// Missing aligned entries read as absent and are treated as empty text.
    pub fn secondary_fragment(&self, unit: usize, fragment: usize) -> Option<&str> {
        self.secondary_units
            .get(unit)
            .and_then(|lines| lines.get(fragment))
            .map(String::as_str)
    }
}
