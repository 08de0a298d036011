//! Static pattern library for the linguistic heuristics.
//!
//! Three tables drive the derived-metadata extractors: speaker attribution
//! patterns (honorific-plus-name and reported-speech markers), rhetorical
//! transition markers (the discourse particles that open a new move in a
//! sugya), and interpretive-layer markers. Keeping them as data lets the sets
//! grow without touching the extraction control flow.

use std::sync::LazyLock;

use regex::Regex;

// ── Speaker attribution ────────────────────────────────────────────────

/// One attribution pattern; capture group 1 is the attributed name.
#[derive(Debug, Clone, Copy)]
pub struct SpeakerPattern {
    pub id: &'static str,
    /// What the pattern matches, for humans reading the table.
    pub description: &'static str,
    pub regex_str: &'static str,
}

/// Ordered by priority; earlier patterns claim a name first.
pub const SPEAKER_PATTERNS: &[SpeakerPattern] = &[
    SpeakerPattern {
        id: "SP-001",
        description: "Rabbi [Name]",
        regex_str: r"רַבִּי\s+([א-ת]+)",
    },
    SpeakerPattern {
        id: "SP-002",
        description: "Rabban [Name]",
        regex_str: r"רַבָּן\s+([א-ת]+)",
    },
    SpeakerPattern {
        id: "SP-003",
        description: "[Name] said",
        regex_str: r"אָמַר\s+([א-ת]+)",
    },
    SpeakerPattern {
        id: "SP-004",
        description: "[Name] said (plural)",
        regex_str: r"אָמְרוּ\s+([א-ת]+)",
    },
    SpeakerPattern {
        id: "SP-005",
        description: "[Name] said to him",
        regex_str: r"אָמַר\s+לֵיהַּ\s+([א-ת]+)",
    },
];

static SPEAKER_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SPEAKER_PATTERNS
        .iter()
        .map(|p| Regex::new(p.regex_str).unwrap())
        .collect()
});

/// Compiled speaker patterns in table order.
pub fn speaker_regexes() -> &'static [Regex] {
    &SPEAKER_REGEXES
}

// ── Rhetorical transitions ─────────────────────────────────────────────

/// A discourse particle that marks a new rhetorical move.
#[derive(Debug, Clone, Copy)]
pub struct TransitionPattern {
    pub id: &'static str,
    pub description: &'static str,
    pub regex_str: &'static str,
}

pub const TRANSITION_PATTERNS: &[TransitionPattern] = &[
    TransitionPattern {
        id: "TR-001",
        description: "Gemara (start of discussion)",
        regex_str: r"גְּמָ׳",
    },
    TransitionPattern {
        id: "TR-002",
        description: "The Master said",
        regex_str: r"אָמַר\s+מָר",
    },
    TransitionPattern {
        id: "TR-003",
        description: "If you wish, say",
        regex_str: r"אִי\s+בָּעֵית\s+אֵימָא",
    },
    TransitionPattern {
        id: "TR-004",
        description: "And so it was taught",
        regex_str: r"וְהָכִי\s+קָתָנֵי",
    },
    TransitionPattern {
        id: "TR-005",
        description: "What is the difference",
        regex_str: r"מַאי\s+שְׁנָא",
    },
    TransitionPattern {
        id: "TR-006",
        description: "Rather",
        regex_str: r"אֵלָּא",
    },
    TransitionPattern {
        id: "TR-007",
        description: "From where do we derive",
        regex_str: r"וּמִנַּיְיהוּ",
    },
    TransitionPattern {
        id: "TR-008",
        description: "Perhaps",
        regex_str: r"דִּלְמָא",
    },
    TransitionPattern {
        id: "TR-009",
        description: "But is it not",
        regex_str: r"אֶלָּא\s+לָאוּ",
    },
    TransitionPattern {
        id: "TR-010",
        description: "Therefore",
        regex_str: r"עַל\s+כֵּן",
    },
    TransitionPattern {
        id: "TR-011",
        description: "If so",
        regex_str: r"אִם\s+כֵּן",
    },
];

static TRANSITION_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TRANSITION_PATTERNS
        .iter()
        .map(|p| Regex::new(p.regex_str).unwrap())
        .collect()
});

/// Compiled transition patterns in table order.
pub fn transition_regexes() -> &'static [Regex] {
    &TRANSITION_REGEXES
}

// ── Interpretive layers ────────────────────────────────────────────────

/// Markers whose presence tags a fragment as homiletical exposition.
pub const DRASH_MARKERS: &[&str] = &["דְרָשׁ", "מִדְרָשׁ"];

/// Markers whose presence tags a fragment as intertextual allusion.
pub const REMEZ_MARKERS: &[&str] = &["רֶמֶז", "מְרֻמָּז"];
