//! Genre chord statistics mined from a song corpus.
//!
//! Dataset chords are normalized to canonical symbols, counted into
//! multi-order Markov transitions and frequent n-grams per genre, and
//! served to the recommendation pipeline through
//! [`progression_engine::StatisticsSource`].

pub mod corpus;
pub mod markov;
pub mod normalize;
pub mod patterns;

pub use corpus::{
    load_progressions_tsv, parse_progressions_tsv, BuildOptions, ChordStats, Corpus, Progression, MARKOV_FILE,
    PATTERNS_FILE,
};
pub use markov::{ExportOptions, MarkovModel, MarkovOptions, Transition, DEFAULT_MIN_PROBABILITY};
pub use normalize::{normalize_chord, normalize_chord_simple, parse_progression_line, ChordNotation};
pub use patterns::{extract_patterns, ChordPattern, PatternMiner, PatternOptions};
