//! Pitch-class spellings and enharmonic normalization.
//!
//! A [`Note`] is one of the 17 conventional spellings of the twelve pitch
//! classes. Indexing, hashing of chord keys, and equality checks between
//! spellings all go through [`Note::canonical`], which maps every spelling
//! to its sharp form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::scale::ScaleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    #[serde(rename = "C#")]
    CSharp,
    Db,
    D,
    #[serde(rename = "D#")]
    DSharp,
    Eb,
    E,
    F,
    #[serde(rename = "F#")]
    FSharp,
    Gb,
    G,
    #[serde(rename = "G#")]
    GSharp,
    Ab,
    A,
    #[serde(rename = "A#")]
    ASharp,
    Bb,
    B,
}

const SHARP_SPELLINGS: [Note; 12] = [
    Note::C,
    Note::CSharp,
    Note::D,
    Note::DSharp,
    Note::E,
    Note::F,
    Note::FSharp,
    Note::G,
    Note::GSharp,
    Note::A,
    Note::ASharp,
    Note::B,
];

const FLAT_SPELLINGS: [Note; 12] = [
    Note::C,
    Note::Db,
    Note::D,
    Note::Eb,
    Note::E,
    Note::F,
    Note::Gb,
    Note::G,
    Note::Ab,
    Note::A,
    Note::Bb,
    Note::B,
];

/// Major keys conventionally written with flats: F Bb Eb Ab Db Gb.
const FLAT_MAJOR_KEYS: [u8; 6] = [5, 10, 3, 8, 1, 6];

/// Minor keys conventionally written with flats: D G C F Bb Eb.
const FLAT_MINOR_KEYS: [u8; 6] = [2, 7, 0, 5, 10, 3];

impl Note {
    /// Every spelling, sharps before flats within each pitch class.
    pub const ALL: [Note; 17] = [
        Note::C,
        Note::CSharp,
        Note::Db,
        Note::D,
        Note::DSharp,
        Note::Eb,
        Note::E,
        Note::F,
        Note::FSharp,
        Note::Gb,
        Note::G,
        Note::GSharp,
        Note::Ab,
        Note::A,
        Note::ASharp,
        Note::Bb,
        Note::B,
    ];

    /// Chromatic index 0–11 with C = 0.
    pub fn index(self) -> u8 {
        match self {
            Note::C => 0,
            Note::CSharp | Note::Db => 1,
            Note::D => 2,
            Note::DSharp | Note::Eb => 3,
            Note::E => 4,
            Note::F => 5,
            Note::FSharp | Note::Gb => 6,
            Note::G => 7,
            Note::GSharp | Note::Ab => 8,
            Note::A => 9,
            Note::ASharp | Note::Bb => 10,
            Note::B => 11,
        }
    }

    /// Sharp spelling of a chromatic index. Wraps modulo 12.
    pub fn from_index(index: u8) -> Note {
        SHARP_SPELLINGS[(index % 12) as usize]
    }

    /// Flat spelling of a chromatic index. Wraps modulo 12.
    pub fn flat_from_index(index: u8) -> Note {
        FLAT_SPELLINGS[(index % 12) as usize]
    }

    /// The sharp form of this pitch class. Idempotent.
    pub fn canonical(self) -> Note {
        Note::from_index(self.index())
    }

    pub fn is_flat(self) -> bool {
        matches!(
            self,
            Note::Db | Note::Eb | Note::Gb | Note::Ab | Note::Bb
        )
    }

    /// Same pitch class regardless of spelling.
    pub fn enharmonic_eq(self, other: Note) -> bool {
        self.canonical() == other.canonical()
    }

    /// Transpose upward by `semitones`, keeping the flat/sharp family of `self`.
    pub fn transpose(self, semitones: u8) -> Note {
        let index = (self.index() + semitones % 12) % 12;
        if self.is_flat() {
            Note::flat_from_index(index)
        } else {
            Note::from_index(index)
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::CSharp => "C#",
            Note::Db => "Db",
            Note::D => "D",
            Note::DSharp => "D#",
            Note::Eb => "Eb",
            Note::E => "E",
            Note::F => "F",
            Note::FSharp => "F#",
            Note::Gb => "Gb",
            Note::G => "G",
            Note::GSharp => "G#",
            Note::Ab => "Ab",
            Note::A => "A",
            Note::ASharp => "A#",
            Note::Bb => "Bb",
            Note::B => "B",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Note {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| TheoryError::UnknownNote(s.to_string()))?;
        let accidental: String = chars.collect();

        let accidental = match accidental.as_str() {
            "" => "",
            "#" | "♯" => "#",
            "b" | "♭" => "b",
            _ => return Err(TheoryError::UnknownNote(s.to_string())),
        };

        Note::ALL
            .iter()
            .copied()
            .find(|n| {
                let name = n.name();
                name.starts_with(letter) && &name[1..] == accidental
            })
            .ok_or_else(|| TheoryError::UnknownNote(s.to_string()))
    }
}

/// How to spell pitch classes with two names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellingPreference {
    Sharp,
    Flat,
    #[default]
    Auto,
}

impl FromStr for SpellingPreference {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharp" | "sharps" | "#" => Ok(SpellingPreference::Sharp),
            "flat" | "flats" | "b" => Ok(SpellingPreference::Flat),
            "auto" => Ok(SpellingPreference::Auto),
            _ => Err(TheoryError::UnknownSpelling(s.to_string())),
        }
    }
}

impl fmt::Display for SpellingPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpellingPreference::Sharp => write!(f, "sharp"),
            SpellingPreference::Flat => write!(f, "flat"),
            SpellingPreference::Auto => write!(f, "auto"),
        }
    }
}

/// Whether a key is conventionally written with flats.
///
/// Minor-family scales use the minor key list, everything else (including
/// no scale at all) the major list.
pub fn key_uses_flats(key: Note, scale_type: Option<ScaleType>) -> bool {
    let index = key.index();
    match scale_type {
        Some(scale) if scale.is_minor_family() => FLAT_MINOR_KEYS.contains(&index),
        _ => FLAT_MAJOR_KEYS.contains(&index),
    }
}

/// Respell `note` for display.
///
/// `Auto` picks flats only when a key is given and that key is one of the
/// conventionally flat keys; otherwise sharps.
pub fn display_note(
    note: Note,
    preference: SpellingPreference,
    key: Option<Note>,
    scale_type: Option<ScaleType>,
) -> Note {
    let use_flats = match preference {
        SpellingPreference::Sharp => false,
        SpellingPreference::Flat => true,
        SpellingPreference::Auto => key.is_some_and(|k| key_uses_flats(k, scale_type)),
    };

    if use_flats {
        Note::flat_from_index(note.index())
    } else {
        Note::from_index(note.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_is_idempotent() {
        for note in Note::ALL {
            assert_eq!(note.canonical().canonical(), note.canonical(), "{note}");
            assert!(!note.canonical().is_flat());
        }
    }

    #[test]
    fn index_round_trips_through_sharp_spelling() {
        for i in 0..12u8 {
            assert_eq!(Note::from_index(i).index(), i);
            assert_eq!(Note::flat_from_index(i).index(), i);
        }
        for note in Note::ALL {
            assert!(Note::from_index(note.index()).enharmonic_eq(note));
        }
    }

    #[test]
    fn enharmonic_equality() {
        assert!(Note::ASharp.enharmonic_eq(Note::Bb));
        assert!(!Note::C.enharmonic_eq(Note::D));
    }

    #[test]
    fn parse_spellings() {
        assert_eq!("C#".parse::<Note>().unwrap(), Note::CSharp);
        assert_eq!("Bb".parse::<Note>().unwrap(), Note::Bb);
        assert_eq!("g".parse::<Note>().unwrap(), Note::G);
        assert_eq!("E♭".parse::<Note>().unwrap(), Note::Eb);
        assert!("H".parse::<Note>().is_err());
        assert!("Cb".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
    }

    #[test]
    fn every_name_parses_back() {
        for note in Note::ALL {
            assert_eq!(note.name().parse::<Note>().unwrap(), note);
        }
    }

    #[test]
    fn display_forced_preferences() {
        assert_eq!(display_note(Note::ASharp, SpellingPreference::Flat, None, None), Note::Bb);
        assert_eq!(display_note(Note::Bb, SpellingPreference::Sharp, None, None), Note::ASharp);
        assert_eq!(display_note(Note::E, SpellingPreference::Flat, None, None), Note::E);
    }

    #[test]
    fn display_auto_follows_key() {
        let auto = SpellingPreference::Auto;
        assert_eq!(display_note(Note::ASharp, auto, Some(Note::F), Some(ScaleType::Major)), Note::Bb);
        assert_eq!(display_note(Note::Bb, auto, Some(Note::G), Some(ScaleType::Major)), Note::ASharp);
        // D minor is a flat key, D major is not
        assert_eq!(display_note(Note::ASharp, auto, Some(Note::D), Some(ScaleType::Minor)), Note::Bb);
        assert_eq!(display_note(Note::ASharp, auto, Some(Note::D), Some(ScaleType::Major)), Note::ASharp);
        assert_eq!(display_note(Note::Db, auto, None, None), Note::CSharp);
    }

    #[test]
    fn transpose_keeps_family() {
        assert_eq!(Note::C.transpose(4), Note::E);
        assert_eq!(Note::Bb.transpose(5), Note::Eb);
        assert_eq!(Note::A.transpose(3), Note::C);
        assert_eq!(Note::FSharp.transpose(1), Note::G);
    }
}
