use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TheoryError;
use crate::note::Note;
use crate::scale::ScaleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Augmented,
    Dominant7,
    Major7,
    Minor7,
    Diminished7,
    HalfDiminished7,
    Sus2,
    Sus4,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 11] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
        ChordQuality::Dominant7,
        ChordQuality::Major7,
        ChordQuality::Minor7,
        ChordQuality::Diminished7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Sus2,
        ChordQuality::Sus4,
    ];

    /// Suffix for chord symbol display
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Augmented => "aug",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }

    /// Enumeration name as accepted by `FromStr`.
    pub fn name(&self) -> &'static str {
        match self {
            ChordQuality::Major => "major",
            ChordQuality::Minor => "minor",
            ChordQuality::Diminished => "diminished",
            ChordQuality::Augmented => "augmented",
            ChordQuality::Dominant7 => "dominant7",
            ChordQuality::Major7 => "major7",
            ChordQuality::Minor7 => "minor7",
            ChordQuality::Diminished7 => "diminished7",
            ChordQuality::HalfDiminished7 => "half_diminished7",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
        }
    }

    /// Minor third above the root (lowercase roman numerals).
    pub fn is_minor_family(&self) -> bool {
        matches!(
            self,
            ChordQuality::Minor
                | ChordQuality::Minor7
                | ChordQuality::Diminished
                | ChordQuality::Diminished7
                | ChordQuality::HalfDiminished7
        )
    }

    pub fn is_seventh(&self) -> bool {
        matches!(
            self,
            ChordQuality::Dominant7
                | ChordQuality::Major7
                | ChordQuality::Minor7
                | ChordQuality::Diminished7
                | ChordQuality::HalfDiminished7
        )
    }

    pub fn is_diminished(&self) -> bool {
        matches!(self, ChordQuality::Diminished | ChordQuality::Diminished7)
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, ChordQuality::Sus2 | ChordQuality::Sus4)
    }

    /// The triad this quality is built on, for template comparisons.
    pub fn base_triad(&self) -> ChordQuality {
        match self {
            ChordQuality::Dominant7 | ChordQuality::Major7 => ChordQuality::Major,
            ChordQuality::Minor7 => ChordQuality::Minor,
            ChordQuality::Diminished7 | ChordQuality::HalfDiminished7 => ChordQuality::Diminished,
            other => *other,
        }
    }
}

impl fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChordQuality {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "major" | "maj" => Ok(ChordQuality::Major),
            "minor" | "min" => Ok(ChordQuality::Minor),
            "diminished" | "dim" => Ok(ChordQuality::Diminished),
            "augmented" | "aug" => Ok(ChordQuality::Augmented),
            "dominant7" | "dom7" => Ok(ChordQuality::Dominant7),
            "major7" | "maj7" => Ok(ChordQuality::Major7),
            "minor7" | "min7" => Ok(ChordQuality::Minor7),
            "diminished7" | "dim7" => Ok(ChordQuality::Diminished7),
            "half_diminished7" | "halfdiminished7" | "m7b5" => Ok(ChordQuality::HalfDiminished7),
            "sus2" => Ok(ChordQuality::Sus2),
            "sus4" => Ok(ChordQuality::Sus4),
            _ => Err(TheoryError::UnknownQuality(s.to_string())),
        }
    }
}

/// A chord with its tones derived from root + quality template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub root: Note,
    pub quality: ChordQuality,
    pub notes: Vec<Note>,
    /// Semitone offsets from the root, ascending.
    pub intervals: Vec<u8>,
}

impl Chord {
    /// Chord symbol: "C", "Bbmaj7", "F#dim".
    pub fn symbol(&self) -> String {
        format!("{}{}", self.root, self.quality.suffix())
    }

    /// Chromatic indices of every tone, root first.
    pub fn pitch_classes(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.index()).collect()
    }

    /// Any two tones six semitones apart.
    pub fn contains_tritone(&self) -> bool {
        let pcs = self.pitch_classes();
        pcs.iter().enumerate().any(|(i, &a)| {
            pcs[i + 1..]
                .iter()
                .any(|&b| (a + 12 - b) % 12 == 6)
        })
    }

    /// Number of pitch classes shared with `other`.
    pub fn common_tones(&self, other: &Chord) -> usize {
        let theirs = other.pitch_classes();
        self.pitch_classes()
            .iter()
            .filter(|pc| theirs.contains(pc))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonicFunction {
    Tonic,
    Subdominant,
    Dominant,
}

impl fmt::Display for HarmonicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarmonicFunction::Tonic => write!(f, "tonic"),
            HarmonicFunction::Subdominant => write!(f, "subdominant"),
            HarmonicFunction::Dominant => write!(f, "dominant"),
        }
    }
}

/// How a chord relates to the active key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorClass {
    Diatonic,
    SecondaryDominant,
    DiminishedPassing,
    Borrowed,
}

impl fmt::Display for ColorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorClass::Diatonic => write!(f, "diatonic"),
            ColorClass::SecondaryDominant => write!(f, "secondary_dominant"),
            ColorClass::DiminishedPassing => write!(f, "diminished_passing"),
            ColorClass::Borrowed => write!(f, "borrowed"),
        }
    }
}

/// A chord placed in harmonic context within a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionNode {
    /// Chord symbol, spelled for the key.
    pub id: String,
    pub chord: Chord,
    pub roman_numeral: String,
    pub function: HarmonicFunction,
    pub category: ColorClass,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// All chords usable in one key/scale. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionMap {
    pub key: Note,
    pub scale_type: ScaleType,
    pub nodes: Vec<ProgressionNode>,
}
