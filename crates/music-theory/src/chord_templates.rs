use crate::error::TheoryError;
use crate::note::Note;
use crate::types::{Chord, ChordQuality};

/// A chord template: quality enum + semitone offsets from the root.
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub intervals: &'static [u8],
}

impl ChordTemplate {
    const fn new(quality: ChordQuality, intervals: &'static [u8]) -> Self {
        Self { quality, intervals }
    }

    /// Bitmask over 12 pitch classes, bit i set for interval i.
    pub fn mask(&self) -> u16 {
        self.intervals.iter().fold(0u16, |mask, &i| mask | 1 << i)
    }
}

/// One template per quality.
pub static TEMPLATES: &[ChordTemplate] = &[
    // Triads
    ChordTemplate::new(ChordQuality::Major, &[0, 4, 7]),
    ChordTemplate::new(ChordQuality::Minor, &[0, 3, 7]),
    ChordTemplate::new(ChordQuality::Diminished, &[0, 3, 6]),
    ChordTemplate::new(ChordQuality::Augmented, &[0, 4, 8]),
    ChordTemplate::new(ChordQuality::Sus2, &[0, 2, 7]),
    ChordTemplate::new(ChordQuality::Sus4, &[0, 5, 7]),
    // Sevenths
    ChordTemplate::new(ChordQuality::Dominant7, &[0, 4, 7, 10]),
    ChordTemplate::new(ChordQuality::Major7, &[0, 4, 7, 11]),
    ChordTemplate::new(ChordQuality::Minor7, &[0, 3, 7, 10]),
    ChordTemplate::new(ChordQuality::Diminished7, &[0, 3, 6, 9]),
    ChordTemplate::new(ChordQuality::HalfDiminished7, &[0, 3, 6, 10]),
];

pub fn template_for(quality: ChordQuality) -> &'static ChordTemplate {
    TEMPLATES
        .iter()
        .find(|t| t.quality == quality)
        .unwrap_or(&TEMPLATES[0])
}

/// Find the quality whose template is exactly `intervals` (order-insensitive).
pub fn quality_for_intervals(intervals: &[u8]) -> Option<ChordQuality> {
    let mask = intervals.iter().fold(0u16, |mask, &i| mask | 1 << (i % 12));
    TEMPLATES
        .iter()
        .find(|t| t.mask() == mask)
        .map(|t| t.quality)
}

/// Build a chord from root + quality.
///
/// Tones follow the root's spelling family: a flat root gets flat tones.
pub fn generate_chord(root: Note, quality: ChordQuality) -> Chord {
    let template = template_for(quality);
    let notes = template
        .intervals
        .iter()
        .map(|&offset| root.transpose(offset))
        .collect();

    Chord {
        root,
        quality,
        notes,
        intervals: template.intervals.to_vec(),
    }
}

/// String-typed entry point. Unknown note or quality produces no chord.
pub fn generate_chord_named(root: &str, quality: &str) -> Result<Chord, TheoryError> {
    let root: Note = root.parse()?;
    let quality: ChordQuality = quality.parse()?;
    Ok(generate_chord(root, quality))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn c_major_triad() {
        let chord = generate_chord(Note::C, ChordQuality::Major);
        assert_eq!(chord.notes, vec![Note::C, Note::E, Note::G]);
        assert_eq!(chord.intervals, vec![0, 4, 7]);
        assert_eq!(chord.symbol(), "C");
    }

    #[test]
    fn g_dominant_7th() {
        let chord = generate_chord(Note::G, ChordQuality::Dominant7);
        assert_eq!(chord.notes, vec![Note::G, Note::B, Note::D, Note::F]);
        assert!(chord.contains_tritone());
        assert_eq!(chord.symbol(), "G7");
    }

    #[test]
    fn flat_root_spells_flat() {
        let chord = generate_chord(Note::Bb, ChordQuality::Minor);
        assert_eq!(chord.notes, vec![Note::Bb, Note::Db, Note::F]);
        assert_eq!(chord.symbol(), "Bbm");
    }

    #[test]
    fn every_quality_has_a_template() {
        for quality in ChordQuality::ALL {
            assert_eq!(template_for(quality).quality, quality);
            let chord = generate_chord(Note::D, quality);
            assert_eq!(chord.notes.len(), chord.intervals.len());
            assert_eq!(chord.notes[0], Note::D);
        }
    }

    #[test]
    fn unknown_quality_produces_no_chord() {
        assert!(matches!(
            generate_chord_named("C", "ninth"),
            Err(TheoryError::UnknownQuality(_))
        ));
        assert!(matches!(
            generate_chord_named("X", "major"),
            Err(TheoryError::UnknownNote(_))
        ));
        let chord = generate_chord_named("A", "minor7").unwrap();
        assert_eq!(chord.notes, vec![Note::A, Note::C, Note::E, Note::G]);
    }

    #[test]
    fn intervals_identify_quality() {
        assert_eq!(quality_for_intervals(&[0, 3, 6, 9]), Some(ChordQuality::Diminished7));
        assert_eq!(quality_for_intervals(&[7, 0, 4]), Some(ChordQuality::Major));
        assert_eq!(quality_for_intervals(&[0, 3, 7, 11]), None);
    }
}
