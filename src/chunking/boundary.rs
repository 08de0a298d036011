//! Boundary detection for the page-accumulated strategy.
//!
//! A [`SegmentAccumulator`] carries the running text, line-index range, and
//! speaker list for the segment being built on one folio page. The split rule
//! fires only once the accumulation has passed a size floor, so a page never
//! opens with an empty leading segment, and the trailing accumulation is
//! always flushed at end of page regardless of the floor.

use crate::chunking::analysis::is_transition;

/// Hard cap on accumulated segment size, in characters.
pub const MAX_SEGMENT_CHARS: usize = 2000;

/// Floor below which no split is considered.
pub const MIN_SEGMENT_CHARS: usize = 200;

/// A completed accumulation, ready to become a segment.
#[derive(Debug, Clone)]
pub struct ClosedAccumulation {
    pub text: String,
    pub line_start: usize,
    pub line_end: usize,
    /// De-duplicated, in first-accumulated order.
    pub speakers: Vec<String>,
}

/// Running accumulation state for one folio page.
#[derive(Debug, Default)]
pub struct SegmentAccumulator {
    text: String,
    char_len: usize,
    lines: Vec<usize>,
    speakers: Vec<String>,
}

impl SegmentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Decides whether the incoming fragment should close the current
    /// accumulation before being appended.
    ///
    /// True when the accumulation is above the size floor and the fragment
    /// introduces a speaker absent from the accumulated list, matches a
    /// rhetorical-transition marker, would push the accumulation past the
    /// size cap, or is the last fragment of the page. Against empty state
    /// the floor can never be met, so the first fragment never splits.
    pub fn should_split(
        &self,
        fragment: &str,
        fragment_speakers: &[String],
        is_last: bool,
    ) -> bool {
        let above_minimum = self.char_len > MIN_SEGMENT_CHARS;
        if !above_minimum {
            return false;
        }

        let speaker_change = fragment_speakers
            .iter()
            .any(|name| !self.speakers.contains(name));
        let would_exceed = self.char_len + fragment.chars().count() > MAX_SEGMENT_CHARS;

        speaker_change || is_transition(fragment) || would_exceed || is_last
    }

    /// Appends a fragment to the accumulation.
    pub fn push(&mut self, fragment: &str, line: usize, fragment_speakers: Vec<String>) {
        if !self.text.is_empty() {
            self.text.push(' ');
            self.char_len += 1;
        }
        self.text.push_str(fragment);
        self.char_len += fragment.chars().count();
        self.lines.push(line);
        self.speakers.extend(fragment_speakers);
    }

    /// Closes the accumulation, returning `None` when nothing was gathered.
    pub fn take(&mut self) -> Option<ClosedAccumulation> {
        if self.text.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.char_len = 0;
        let lines = std::mem::take(&mut self.lines);
        let raw_speakers = std::mem::take(&mut self.speakers);

        let mut speakers: Vec<String> = Vec::with_capacity(raw_speakers.len());
        for name in raw_speakers {
            if !speakers.contains(&name) {
                speakers.push(name);
            }
        }

        let line_start = lines.first().copied().unwrap_or(0);
        let line_end = lines.last().copied().unwrap_or(line_start);
        Some(ClosedAccumulation {
            text,
            line_start,
            line_end,
            speakers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulation_never_closes() {
        let mut acc = SegmentAccumulator::new();
        assert!(acc.take().is_none());
    }

    #[test]
    fn first_fragment_never_splits() {
        let acc = SegmentAccumulator::new();
        let speakers = vec!["יוחנן".to_string()];
        assert!(!acc.should_split(&"x".repeat(5000), &speakers, true));
    }

    #[test]
    fn below_floor_never_splits() {
        let mut acc = SegmentAccumulator::new();
        acc.push(&"a".repeat(150), 0, Vec::new());
        assert!(!acc.should_split(&"b".repeat(3000), &[], true));
    }

    #[test]
    fn size_cap_triggers_split_above_floor() {
        let mut acc = SegmentAccumulator::new();
        acc.push(&"a".repeat(1500), 0, Vec::new());
        assert!(acc.should_split(&"b".repeat(600), &[], false));
        assert!(!acc.should_split("short", &[], false));
    }

    #[test]
    fn new_speaker_triggers_split_above_floor() {
        let mut acc = SegmentAccumulator::new();
        acc.push(&"a".repeat(300), 0, vec!["יוחנן".to_string()]);
        assert!(acc.should_split("x", &["מאיר".to_string()], false));
        // A speaker already accumulated does not.
        assert!(!acc.should_split("x", &["יוחנן".to_string()], false));
    }

    #[test]
    fn last_fragment_triggers_split_above_floor() {
        let mut acc = SegmentAccumulator::new();
        acc.push(&"a".repeat(300), 0, Vec::new());
        assert!(acc.should_split("tail", &[], true));
    }

    #[test]
    fn take_joins_with_spaces_and_tracks_lines() {
        let mut acc = SegmentAccumulator::new();
        acc.push("one", 3, Vec::new());
        acc.push("two", 4, Vec::new());
        acc.push("three", 7, Vec::new());
        let closed = acc.take().unwrap();
        assert_eq!(closed.text, "one two three");
        assert_eq!((closed.line_start, closed.line_end), (3, 7));
        assert!(acc.take().is_none());
    }

    #[test]
    fn take_deduplicates_speakers_in_order() {
        let mut acc = SegmentAccumulator::new();
        acc.push("a", 0, vec!["ב".to_string(), "א".to_string()]);
        acc.push("b", 1, vec!["א".to_string(), "ג".to_string()]);
        let closed = acc.take().unwrap();
        assert_eq!(closed.speakers, vec!["ב", "א", "ג"]);
    }
}
