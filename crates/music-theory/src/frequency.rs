//! Equal-tempered pitch frequencies.

use serde::{Deserialize, Serialize};

use crate::note::Note;

/// Octave-4 frequencies in Hz, indexed by chromatic index (C = 0).
pub const REFERENCE_OCTAVE_4: [f64; 12] = [
    261.63, 277.18, 293.66, 311.13, 329.63, 349.23, 369.99, 392.00, 415.30, 440.00, 466.16, 493.88,
];

/// Standard re-entrant ukulele tuning, G4 C4 E4 A4.
pub const UKULELE_TUNING: [(Note, f64); 4] = [
    (Note::G, 392.00),
    (Note::C, 261.63),
    (Note::E, 329.63),
    (Note::A, 440.00),
];

/// `ref_hz * 2^(offset/12)`.
pub fn semitones_to_hz(offset: i32, ref_hz: f64) -> f64 {
    ref_hz * 2f64.powf(offset as f64 / 12.0)
}

pub fn note_frequency(note: Note, octave: i32) -> f64 {
    let reference = REFERENCE_OCTAVE_4[note.index() as usize];
    semitones_to_hz((octave - 4) * 12, reference)
}

fn round2(hz: f64) -> f64 {
    (hz * 100.0).round() / 100.0
}

/// One fret on one string.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FretPosition {
    pub string: Note,
    pub fret: u8,
    pub note: Note,
    pub frequency_hz: f64,
}

/// Frets `0..=frets` on every open string. The open string keeps its
/// given frequency; fretted positions are rounded to 0.01 Hz.
pub fn fretboard(open_strings: &[(Note, f64)], frets: u8) -> Vec<FretPosition> {
    open_strings
        .iter()
        .flat_map(|&(string, open_hz)| {
            (0..=frets).map(move |fret| FretPosition {
                string,
                fret,
                note: string.transpose(fret),
                frequency_hz: if fret == 0 {
                    open_hz
                } else {
                    round2(semitones_to_hz(fret as i32, open_hz))
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        ((a - b) / b).abs() < 1e-6
    }

    #[test]
    fn octave_doubles() {
        assert!(close(semitones_to_hz(12, 440.0), 880.0));
        assert!(close(semitones_to_hz(-12, 440.0), 220.0));
        assert!(close(semitones_to_hz(0, 261.63), 261.63));
        assert!(close(semitones_to_hz(7, 440.0), 440.0 * 2f64.powf(7.0 / 12.0)));
    }

    #[test]
    fn reference_notes() {
        assert!(close(note_frequency(Note::A, 4), 440.0));
        assert!(close(note_frequency(Note::A, 3), 220.0));
        assert!(close(note_frequency(Note::Bb, 4), note_frequency(Note::ASharp, 4)));
        assert!(close(note_frequency(Note::C, 5), 523.26));
    }

    #[test]
    fn ukulele_fretboard() {
        let rows = fretboard(&UKULELE_TUNING, 12);
        assert_eq!(rows.len(), 4 * 13);

        let a_open = rows.iter().find(|r| r.string == Note::A && r.fret == 0).unwrap();
        assert_eq!(a_open.frequency_hz, 440.0);

        let a_twelfth = rows.iter().find(|r| r.string == Note::A && r.fret == 12).unwrap();
        assert_eq!(a_twelfth.frequency_hz, 880.0);
        assert_eq!(a_twelfth.note, Note::A);

        let c_fourth = rows.iter().find(|r| r.string == Note::C && r.fret == 4).unwrap();
        assert_eq!(c_fourth.note, Note::E);
        assert_eq!(c_fourth.frequency_hz, 329.63);
    }
}
