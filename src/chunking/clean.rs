//! Fragment text cleaning.
//!
//! Export fragments carry inline markup (`<b>`, `<i>`, footnote spans) and
//! HTML space entities. [`clean_fragment`] strips the tags, maps the space
//! entities to ordinary spaces, collapses whitespace runs, and trims. The
//! pass is idempotent: already-clean text comes back borrowed and unchanged.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Named and numeric entities for non-breaking and thin spaces.
static SPACE_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(?:nbsp|thinsp|#160|#8201);").unwrap());

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Cleans one raw fragment for either script.
///
/// Returns `Cow::Borrowed` when the input is already clean.
pub fn clean_fragment(raw: &str) -> Cow<'_, str> {
    if is_clean(raw) {
        return Cow::Borrowed(raw);
    }

    let stripped = TAG_RE.replace_all(raw, "");
    let spaced = SPACE_ENTITY_RE.replace_all(&stripped, " ");
    let collapsed = WHITESPACE_RE.replace_all(&spaced, " ");
    Cow::Owned(collapsed.trim().to_string())
}

fn is_clean(text: &str) -> bool {
    if text.contains('<') || SPACE_ENTITY_RE.is_match(text) {
        return false;
    }
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        return false;
    }
    // Any whitespace other than a single interior space needs collapsing.
    let mut prev_was_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if c != ' ' || prev_was_space {
                return false;
            }
            prev_was_space = true;
        } else {
            prev_was_space = false;
        }
    }
    true
}
