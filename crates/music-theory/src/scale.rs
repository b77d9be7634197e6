//! Scale types, interval patterns, and diatonic chord qualities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chord_templates::quality_for_intervals;
use crate::error::TheoryError;
use crate::note::{display_note, Note, SpellingPreference};
use crate::types::ChordQuality;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Major,
    Minor,
    HarmonicMinor,
    MelodicMinor,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
}

impl ScaleType {
    pub const ALL: [ScaleType; 9] = [
        ScaleType::Major,
        ScaleType::Minor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
    ];

    /// Semitone offsets of the seven degrees from the tonic.
    pub fn intervals(&self) -> &'static [u8; 7] {
        match self {
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::Minor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],
        }
    }

    /// Scales with a minor third above the tonic.
    pub fn is_minor_family(&self) -> bool {
        self.intervals()[2] == 3
    }

    /// Parallel mode used for borrowed chords.
    pub fn parallel(&self) -> ScaleType {
        if self.is_minor_family() {
            ScaleType::Major
        } else {
            ScaleType::Minor
        }
    }

    pub fn contains_interval(&self, interval: u8) -> bool {
        self.intervals().contains(&(interval % 12))
    }

    /// Degree index 0–6 for an interval exactly on the scale.
    pub fn degree_of(&self, interval: u8) -> Option<usize> {
        self.intervals().iter().position(|&i| i == interval % 12)
    }

    fn stacked(&self, degree: usize, count: usize) -> Vec<u8> {
        let intervals = self.intervals();
        let base = intervals[degree % 7];
        (0..count)
            .map(|step| (intervals[(degree + step * 2) % 7] + 12 - base) % 12)
            .collect()
    }

    /// Triad quality built by stacking scale thirds on `degree`.
    pub fn diatonic_triad(&self, degree: usize) -> Option<ChordQuality> {
        quality_for_intervals(&self.stacked(degree, 3))
    }

    /// Seventh-chord quality on `degree`, when one of the known templates fits.
    pub fn diatonic_seventh(&self, degree: usize) -> Option<ChordQuality> {
        quality_for_intervals(&self.stacked(degree, 4))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScaleType::Major => "major",
            ScaleType::Minor => "minor",
            ScaleType::HarmonicMinor => "harmonic_minor",
            ScaleType::MelodicMinor => "melodic_minor",
            ScaleType::Dorian => "dorian",
            ScaleType::Phrygian => "phrygian",
            ScaleType::Lydian => "lydian",
            ScaleType::Mixolydian => "mixolydian",
            ScaleType::Locrian => "locrian",
        }
    }
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScaleType {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "major" | "ionian" => Ok(ScaleType::Major),
            "minor" | "natural_minor" | "aeolian" => Ok(ScaleType::Minor),
            "harmonic_minor" => Ok(ScaleType::HarmonicMinor),
            "melodic_minor" => Ok(ScaleType::MelodicMinor),
            "dorian" => Ok(ScaleType::Dorian),
            "phrygian" => Ok(ScaleType::Phrygian),
            "lydian" => Ok(ScaleType::Lydian),
            "mixolydian" => Ok(ScaleType::Mixolydian),
            "locrian" => Ok(ScaleType::Locrian),
            _ => Err(TheoryError::UnknownScale(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub root: Note,
    pub scale_type: ScaleType,
    pub notes: Vec<Note>,
}

/// Spell the seven degrees of `scale_type` on `root`, using the key's
/// conventional sharp/flat spelling.
pub fn generate_scale(root: Note, scale_type: ScaleType) -> Scale {
    let notes = scale_type
        .intervals()
        .iter()
        .map(|&offset| {
            let note = Note::from_index(root.index() + offset);
            display_note(note, SpellingPreference::Auto, Some(root), Some(scale_type))
        })
        .collect();

    Scale {
        root,
        scale_type,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn c_major_scale() {
        let scale = generate_scale(Note::C, ScaleType::Major);
        assert_eq!(
            scale.notes,
            vec![Note::C, Note::D, Note::E, Note::F, Note::G, Note::A, Note::B]
        );
    }

    #[test]
    fn f_major_uses_flats() {
        let scale = generate_scale(Note::F, ScaleType::Major);
        assert_eq!(scale.notes[3], Note::Bb);
    }

    #[test]
    fn a_minor_scale() {
        let scale = generate_scale(Note::A, ScaleType::Minor);
        assert_eq!(
            scale.notes,
            vec![Note::A, Note::B, Note::C, Note::D, Note::E, Note::F, Note::G]
        );
    }

    #[test]
    fn diatonic_triads_in_major() {
        let expected = [
            ChordQuality::Major,
            ChordQuality::Minor,
            ChordQuality::Minor,
            ChordQuality::Major,
            ChordQuality::Major,
            ChordQuality::Minor,
            ChordQuality::Diminished,
        ];
        for (degree, quality) in expected.iter().enumerate() {
            assert_eq!(ScaleType::Major.diatonic_triad(degree), Some(*quality), "degree {degree}");
        }
    }

    #[test]
    fn diatonic_sevenths_in_major() {
        assert_eq!(ScaleType::Major.diatonic_seventh(0), Some(ChordQuality::Major7));
        assert_eq!(ScaleType::Major.diatonic_seventh(1), Some(ChordQuality::Minor7));
        assert_eq!(ScaleType::Major.diatonic_seventh(4), Some(ChordQuality::Dominant7));
        assert_eq!(ScaleType::Major.diatonic_seventh(6), Some(ChordQuality::HalfDiminished7));
        // minor-major seventh has no template
        assert_eq!(ScaleType::HarmonicMinor.diatonic_seventh(0), None);
        assert_eq!(ScaleType::HarmonicMinor.diatonic_seventh(6), Some(ChordQuality::Diminished7));
    }

    #[test]
    fn minor_family_and_parallel() {
        assert!(ScaleType::Dorian.is_minor_family());
        assert!(!ScaleType::Mixolydian.is_minor_family());
        assert_eq!(ScaleType::Major.parallel(), ScaleType::Minor);
        assert_eq!(ScaleType::HarmonicMinor.parallel(), ScaleType::Major);
    }

    #[test]
    fn parse_scale_names() {
        for scale in ScaleType::ALL {
            assert_eq!(scale.name().parse::<ScaleType>().unwrap(), scale);
        }
        assert_eq!("Harmonic Minor".parse::<ScaleType>().unwrap(), ScaleType::HarmonicMinor);
        assert!("pentatonic".parse::<ScaleType>().is_err());
    }
}
