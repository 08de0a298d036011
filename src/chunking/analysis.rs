//! Derived-metadata extractors: speakers, topic hints, interpretive layers.

use crate::chunking::clean::clean_fragment;
use crate::chunking::patterns::{
    speaker_regexes, transition_regexes, DRASH_MARKERS, REMEZ_MARKERS,
};
use crate::chunking::segment::InterpretiveLayer;

/// Maximum length of a topic hint before the ellipsis marker is appended.
const TOPIC_HINT_CHARS: usize = 50;

/// Scans a primary-script fragment for attributed speakers.
///
/// Patterns are evaluated in table priority order; a name enters the result
/// the first time any pattern captures it and later captures of the same
/// spelling are suppressed. No matches is a normal outcome.
pub fn extract_speakers(text: &str) -> Vec<String> {
    let mut speakers: Vec<String> = Vec::new();
    for re in speaker_regexes() {
        for caps in re.captures_iter(text) {
            if let Some(name) = caps.get(1) {
                let name = name.as_str();
                if !speakers.iter().any(|seen| seen == name) {
                    speakers.push(name.to_string());
                }
            }
        }
    }
    speakers
}

/// True when the fragment opens a new rhetorical move.
pub fn is_transition(text: &str) -> bool {
    transition_regexes().iter().any(|re| re.is_match(text))
}

/// Derives a short human-readable label from the fragment's first sentence.
///
/// The fragment is cleaned, split on sentence-terminal punctuation, and the
/// first piece is trimmed and capped at 50 characters with a `…` marker when
/// truncated. Empty input yields an empty string.
pub fn topic_hint(text: &str) -> String {
    let cleaned = clean_fragment(text);
    let first = cleaned
        .split(['.', '!', '?'])
        .next()
        .unwrap_or("")
        .trim();

    let mut hint: String = first.chars().take(TOPIC_HINT_CHARS).collect();
    if first.chars().count() > TOPIC_HINT_CHARS {
        hint.push('…');
    }
    hint
}

/// Tags a fragment with its apparent interpretive layer.
///
/// First-match priority over the marker tables: homiletical markers win,
/// then intertextual markers, and plain-sense is the default. This is a
/// keyword heuristic, not a guarantee of correct classification.
pub fn classify_layer(text: &str) -> InterpretiveLayer {
    if DRASH_MARKERS.iter().any(|marker| text.contains(marker)) {
        InterpretiveLayer::Drash
    } else if REMEZ_MARKERS.iter().any(|marker| text.contains(marker)) {
        InterpretiveLayer::Remez
    } else {
        InterpretiveLayer::Peshat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speakers_in_first_occurrence_order() {
        let text = "רַבִּי יוחנן וְרַבָּן גמליאל";
        let speakers = extract_speakers(text);
        // Pattern priority: Rabbi honorific before Rabban.
        assert_eq!(speakers, vec!["יוחנן", "גמליאל"]);
    }

    #[test]
    fn repeated_names_are_suppressed() {
        let text = "רַבִּי מאיר ... רַבִּי מאיר ... אָמַר מאיר";
        let speakers = extract_speakers(text);
        assert_eq!(speakers.iter().filter(|s| *s == "מאיר").count(), 1);
    }

    #[test]
    fn never_returns_duplicates() {
        let samples = [
            "רַבִּי יהודה אָמַר יהודה רַבִּי יהודה",
            "אָמְרוּ חכמים אָמְרוּ חכמים",
            "no hebrew here at all",
            "",
        ];
        for text in samples {
            let speakers = extract_speakers(text);
            let mut deduped = speakers.clone();
            deduped.sort();
            deduped.dedup();
            assert_eq!(speakers.len(), deduped.len(), "duplicates for {text:?}");
        }
    }

    #[test]
    fn no_match_is_empty_list() {
        assert!(extract_speakers("plain narration").is_empty());
    }

    #[test]
    fn topic_hint_takes_first_sentence() {
        assert_eq!(topic_hint("First thought. Second thought."), "First thought");
        assert_eq!(topic_hint("A question? Follow-up."), "A question");
    }

    #[test]
    fn topic_hint_truncates_with_ellipsis() {
        let long = "x".repeat(80);
        let hint = topic_hint(&long);
        assert_eq!(hint.chars().count(), 51);
        assert!(hint.ends_with('…'));
    }

    #[test]
    fn topic_hint_bounded_for_any_input() {
        let inputs = ["", "short", &"y".repeat(200), "<b>tagged</b> text. more"];
        for input in inputs {
            assert!(topic_hint(input).chars().count() <= 51);
        }
    }

    #[test]
    fn topic_hint_empty_input() {
        assert_eq!(topic_hint(""), "");
        assert_eq!(topic_hint("<br/>"), "");
    }

    #[test]
    fn layer_priority_drash_over_remez() {
        assert_eq!(classify_layer("יש כאן מִדְרָשׁ וגם רֶמֶז"), InterpretiveLayer::Drash);
        assert_eq!(classify_layer("רֶמֶז בלבד"), InterpretiveLayer::Remez);
        assert_eq!(classify_layer("דברים כפשוטם"), InterpretiveLayer::Peshat);
    }

    #[test]
    fn transition_detection() {
        assert!(is_transition("אִם כֵּן מה הועילו"));
        assert!(!is_transition("sentence with no markers"));
    }
}
