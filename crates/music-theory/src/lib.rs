//! Music primitives and harmonic classification.
//!
//! Notes with enharmonic spelling, chord and scale construction from fixed
//! interval templates, the chord-symbol grammar, per-key classification
//! (distance, color, function, numeral, tension), and the theory-derived
//! progression map every downstream scoring stage reads from.

pub mod chord_templates;
pub mod classify;
pub mod error;
pub mod frequency;
pub mod note;
pub mod progression_map;
pub mod scale;
pub mod symbol;
pub mod types;

pub use chord_templates::{generate_chord, generate_chord_named};
pub use classify::{
    classify_color, harmonic_distance, infer_harmonic_function, infer_roman_numeral,
    interval_from_key, node_tension, tension_level,
};
pub use error::TheoryError;
pub use frequency::{fretboard, note_frequency, semitones_to_hz, FretPosition};
pub use note::{display_note, key_uses_flats, Note, SpellingPreference};
pub use progression_map::build_progression_map;
pub use scale::{generate_scale, Scale, ScaleType};
pub use symbol::{canonical_symbol, parse_chord_symbol, symbols_match, ParsedChord, SymbolParse};
pub use types::{Chord, ChordQuality, ColorClass, HarmonicFunction, ProgressionMap, ProgressionNode};
