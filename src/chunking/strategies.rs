//! The three per-category chunking strategies.
//!
//! Each strategy is a pure function from a normalized [`SourceDocument`] to
//! an ordered sequence of [`Segment`]s; no I/O, no shared state, and no
//! failure modes beyond producing an empty sequence for degenerate input.

use std::borrow::Cow;

use crate::chunking::analysis::{classify_layer, extract_speakers, topic_hint};
use crate::chunking::boundary::{ClosedAccumulation, SegmentAccumulator};
use crate::chunking::clean::clean_fragment;
use crate::chunking::document::SourceDocument;
use crate::chunking::segment::{Segment, SegmentAttributes};
use crate::types::SourceCategory;

/// Verse-addressed strategy: outer units are chapters, fragments are verses.
///
/// Scripture narration carries no dialogic speaker by convention, so the
/// speakers list is always empty here.
pub(crate) fn chunk_by_verse(doc: &SourceDocument) -> Vec<Segment> {
    chunk_addressed(doc, SourceCategory::Torah, false)
}

/// Unit-addressed strategy: outer units are chapters, fragments are
/// mishnayot. Identical addressing to the verse strategy, but speaker
/// attribution applies.
pub(crate) fn chunk_by_unit(doc: &SourceDocument) -> Vec<Segment> {
    chunk_addressed(doc, SourceCategory::Mishnah, true)
}

fn chunk_addressed(
    doc: &SourceDocument,
    category: SourceCategory,
    attribute_speakers: bool,
) -> Vec<Segment> {
    let mut segments = Vec::new();

    for (chapter_idx, unit) in doc.units().iter().enumerate() {
        for (fragment_idx, fragment) in unit.iter().enumerate() {
            let primary = clean_fragment(fragment).into_owned();
            let secondary = cleaned_secondary(doc, chapter_idx, fragment_idx);

            let content: &str = if primary.is_empty() {
                secondary.as_deref().unwrap_or("")
            } else {
                &primary
            };
            if content.is_empty() {
                // Blank verses are common in the export; skip silently.
                continue;
            }

            let speakers = if attribute_speakers {
                extract_speakers(content)
            } else {
                Vec::new()
            };
            let attributes = SegmentAttributes {
                chapter: Some(chapter_idx + 1),
                verse_or_unit: Some((fragment_idx + 1).to_string()),
                speakers,
                topic: topic_hint(content),
                layer: classify_layer(content),
                ..SegmentAttributes::default()
            };
            let reference =
                format!("{} {}:{}", doc.title, chapter_idx + 1, fragment_idx + 1);

            segments.push(Segment::new(
                primary,
                secondary.filter(|s| !s.is_empty()),
                category,
                reference,
                attributes,
            ));
        }
    }

    segments
}

/// Page-accumulated strategy: outer units are folio pages.
///
/// Lines are cleaned and fed to the boundary accumulator; each closed
/// accumulation becomes one segment addressed `{title} {folio}:{start}-{end}`.
/// The first two raw units are conventionally blank front matter, hence the
/// page numbering offset. Note the known asymmetry with the other
/// strategies: the emitted segment carries the joined accumulation as its
/// primary content only, whichever script each line came from; the
/// secondary script is not preserved in parallel.
pub(crate) fn chunk_by_folio(doc: &SourceDocument) -> Vec<Segment> {
    let mut segments = Vec::new();

    for (page_idx, lines) in doc.units().iter().enumerate() {
        // Empty pages produce nothing, not even an empty segment.
        if lines.is_empty() {
            continue;
        }

        let folio = folio_label(page_idx);
        let mut acc = SegmentAccumulator::new();

        for (line_idx, line) in lines.iter().enumerate() {
            let primary = clean_fragment(line);
            let content: Cow<'_, str> = if primary.is_empty() {
                match cleaned_secondary(doc, page_idx, line_idx) {
                    Some(secondary) if !secondary.is_empty() => Cow::Owned(secondary),
                    _ => continue,
                }
            } else {
                primary
            };

            let speakers = extract_speakers(&content);
            let is_last = line_idx == lines.len() - 1;

            if acc.should_split(&content, &speakers, is_last) {
                if let Some(closed) = acc.take() {
                    segments.push(folio_segment(&doc.title, &folio, closed));
                }
            }
            acc.push(&content, line_idx, speakers);
        }

        if let Some(closed) = acc.take() {
            segments.push(folio_segment(&doc.title, &folio, closed));
        }
    }

    segments
}

/// Maps a raw outer-unit index to a two-sided folio label: 0 → `2a`,
/// 1 → `2b`, 2 → `3a`, and so on.
fn folio_label(page_idx: usize) -> String {
    let number = page_idx / 2 + 2;
    let side = if page_idx % 2 == 0 { 'a' } else { 'b' };
    format!("{number}{side}")
}

fn folio_segment(title: &str, folio: &str, closed: ClosedAccumulation) -> Segment {
    let attributes = SegmentAttributes {
        folio: Some(folio.to_string()),
        line_start: Some(closed.line_start),
        line_end: Some(closed.line_end),
        speakers: closed.speakers,
        topic: topic_hint(&closed.text),
        layer: classify_layer(&closed.text),
        ..SegmentAttributes::default()
    };
    let reference = format!(
        "{} {}:{}-{}",
        title, folio, closed.line_start, closed.line_end
    );
    Segment::new(closed.text, None, SourceCategory::Talmud, reference, attributes)
}

fn cleaned_secondary(doc: &SourceDocument, unit: usize, fragment: usize) -> Option<String> {
    doc.secondary_fragment(unit, fragment)
        .map(|raw| clean_fragment(raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, units: Vec<Vec<&str>>, secondary: Vec<Vec<&str>>) -> SourceDocument {
        let own = |nested: Vec<Vec<&str>>| {
            nested
                .into_iter()
                .map(|unit| unit.into_iter().map(str::to_string).collect())
                .collect()
        };
        SourceDocument::from_units(title, own(units), own(secondary))
    }

    #[test]
    fn verse_strategy_addresses_chapter_and_verse() {
        let d = doc(
            "Genesis",
            vec![vec!["In the beginning"]],
            vec![vec!["בְּרֵאשִׁית"]],
        );
        let segments = chunk_by_verse(&d);
        assert_eq!(segments.len(), 1);
        let seg = &segments[0];
        assert_eq!(seg.reference, "Genesis 1:1");
        assert_eq!(seg.content, "In the beginning");
        assert_eq!(seg.secondary_content.as_deref(), Some("בְּרֵאשִׁית"));
        assert_eq!(seg.attributes.chapter, Some(1));
        assert_eq!(seg.attributes.verse_or_unit.as_deref(), Some("1"));
        assert!(seg.attributes.speakers.is_empty());
    }

    #[test]
    fn verse_strategy_never_attributes_speakers() {
        let d = doc("Genesis", vec![vec!["רַבִּי יוחנן"]], vec![]);
        let segments = chunk_by_verse(&d);
        assert!(segments[0].attributes.speakers.is_empty());
    }

    #[test]
    fn blank_verses_are_skipped() {
        let d = doc("Exodus", vec![vec!["<br/>", "second verse"]], vec![]);
        let segments = chunk_by_verse(&d);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].reference, "Exodus 1:2");
    }

    #[test]
    fn verse_falls_back_to_secondary_script() {
        let d = doc("Genesis", vec![vec![""]], vec![vec!["בְּרֵאשִׁית בָּרָא"]]);
        let segments = chunk_by_verse(&d);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].content, "בְּרֵאשִׁית בָּרָא");
        assert!(segments[0].primary_content.is_empty());
    }

    #[test]
    fn unit_strategy_attributes_speakers() {
        let d = doc("Mishnah Berakhot", vec![vec!["רַבִּי אליעזר אומר"]], vec![]);
        let segments = chunk_by_unit(&d);
        assert_eq!(segments[0].attributes.speakers, vec!["אליעזר"]);
        assert_eq!(segments[0].category, SourceCategory::Mishnah);
    }

    #[test]
    fn folio_labels_follow_two_sided_numbering() {
        assert_eq!(folio_label(0), "2a");
        assert_eq!(folio_label(1), "2b");
        assert_eq!(folio_label(2), "3a");
        assert_eq!(folio_label(3), "3b");
    }

    #[test]
    fn empty_pages_emit_nothing() {
        let d = doc("Berakhot", vec![vec![], vec![], vec!["first line"]], vec![]);
        let segments = chunk_by_folio(&d);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].attributes.folio.as_deref(), Some("3a"));
        assert_eq!(segments[0].reference, "Berakhot 3a:0-0");
    }

    #[test]
    fn folio_segments_collapse_scripts_into_primary() {
        let d = doc("Berakhot", vec![vec!["line one", "line two"]], vec![]);
        let segments = chunk_by_folio(&d);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].primary_content, "line one line two");
        assert!(segments[0].secondary_content.is_none());
    }

    #[test]
    fn size_cap_splits_long_pages() {
        // Three 700-char lines: the third would push past the 2000-char cap.
        let line = "a".repeat(700);
        let d = doc(
            "Shabbat",
            vec![vec![line.as_str(), line.as_str(), line.as_str()]],
            vec![],
        );
        let segments = chunk_by_folio(&d);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].attributes.line_start, Some(0));
        assert_eq!(segments[0].attributes.line_end, Some(1));
        assert_eq!(segments[1].attributes.line_start, Some(2));
        assert_eq!(segments[1].attributes.line_end, Some(2));

        let rejoined = format!("{} {}", segments[0].content, segments[1].content);
        assert_eq!(rejoined, format!("{line} {line} {line}"));
    }

    #[test]
    fn zero_units_produce_zero_segments() {
        let d = doc("Empty", vec![], vec![]);
        assert!(chunk_by_verse(&d).is_empty());
        assert!(chunk_by_unit(&d).is_empty());
        assert!(chunk_by_folio(&d).is_empty());
    }
}
