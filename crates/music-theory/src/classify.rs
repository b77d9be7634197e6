//! Harmonic classification of a chord relative to a key.
//!
//! Everything here is a pure function of (chord, key, scale): harmonic
//! distance, color class, harmonic function, roman numeral, and tension.

use crate::note::Note;
use crate::scale::ScaleType;
use crate::types::{Chord, ChordQuality, ColorClass, HarmonicFunction, ProgressionNode};

/// Penalty when the root sits outside the scale.
pub const ROOT_OUTSIDE_PENALTY: f64 = 1.0;
/// Penalty per chord tone outside the scale (the root is tested too).
pub const TONE_OUTSIDE_PENALTY: f64 = 0.5;
/// Penalty when any pair of chord tones is a tritone apart.
pub const TRITONE_PENALTY: f64 = 0.5;

const TONIC_TENSION: f64 = 0.1;
const SUBDOMINANT_TENSION: f64 = 0.4;
const DOMINANT_TENSION: f64 = 0.7;
const SEVENTH_TENSION: f64 = 0.1;
const ALTERED_TENSION: f64 = 0.15;
const DISTANCE_TENSION: f64 = 0.05;

const ROMAN_UPPER: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Semitones from the key's tonic up to `note`.
pub fn interval_from_key(note: Note, key: Note) -> u8 {
    (note.index() + 12 - key.index()) % 12
}

/// Additive chromaticism penalty; 0 for chords made only of scale tones
/// with no tritone.
pub fn harmonic_distance(chord: &Chord, key: Note, scale_type: ScaleType) -> f64 {
    let mut distance = 0.0;

    if !scale_type.contains_interval(interval_from_key(chord.root, key)) {
        distance += ROOT_OUTSIDE_PENALTY;
    }

    for note in &chord.notes {
        if !scale_type.contains_interval(interval_from_key(*note, key)) {
            distance += TONE_OUTSIDE_PENALTY;
        }
    }

    if chord.contains_tritone() {
        distance += TRITONE_PENALTY;
    }

    distance
}

/// Every tone of `chord` belongs to the scale.
pub fn all_tones_in_scale(chord: &Chord, key: Note, scale_type: ScaleType) -> bool {
    chord
        .notes
        .iter()
        .all(|n| scale_type.contains_interval(interval_from_key(*n, key)))
}

/// Root on a scale degree with the quality the scale itself builds there.
/// Suspended chords count when all their tones are scale tones.
fn is_exact_diatonic(chord: &Chord, key: Note, scale_type: ScaleType) -> bool {
    let Some(degree) = scale_type.degree_of(interval_from_key(chord.root, key)) else {
        return false;
    };

    if chord.quality.is_suspended() {
        return all_tones_in_scale(chord, key, scale_type);
    }

    scale_type.diatonic_triad(degree) == Some(chord.quality)
        || scale_type.diatonic_seventh(degree) == Some(chord.quality)
}

/// Exact diatonic chords first. Dominant sevenths off the diatonic V are
/// secondary dominants and diminished chords off the diatonic vii are
/// passing chords. Everything else, including a dominant seventh on V that
/// the scale doesn't build, is borrowed.
pub fn classify_color(chord: &Chord, key: Note, scale_type: ScaleType) -> ColorClass {
    if is_exact_diatonic(chord, key, scale_type) {
        return ColorClass::Diatonic;
    }

    let interval = interval_from_key(chord.root, key);
    let degrees = scale_type.intervals();
    match chord.quality {
        ChordQuality::Dominant7 if interval != degrees[4] => ColorClass::SecondaryDominant,
        ChordQuality::Diminished | ChordQuality::Diminished7 if interval != degrees[6] => {
            ColorClass::DiminishedPassing
        }
        _ => ColorClass::Borrowed,
    }
}

/// I, iii, vi are tonic; ii, IV subdominant; V, vii dominant.
pub fn function_for_degree(degree: usize) -> HarmonicFunction {
    match degree % 7 {
        0 | 2 | 5 => HarmonicFunction::Tonic,
        1 | 3 => HarmonicFunction::Subdominant,
        _ => HarmonicFunction::Dominant,
    }
}

/// Nearest scale degree to `interval` by circular semitone distance.
///
/// Ties go to the lower degree index. Returns the degree and the signed
/// offset from it (-1, 0, +1 for heptatonic scales).
pub fn nearest_degree(interval: u8, scale_type: ScaleType) -> (usize, i8) {
    let interval = interval % 12;
    let mut best = (0usize, 0i8);
    let mut best_distance = u8::MAX;

    for (degree, &degree_interval) in scale_type.intervals().iter().enumerate() {
        let up = (interval + 12 - degree_interval) % 12;
        let down = (degree_interval + 12 - interval) % 12;
        let (distance, offset) = if up <= down {
            (up, up as i8)
        } else {
            (down, -(down as i8))
        };
        if distance < best_distance {
            best_distance = distance;
            best = (degree, offset);
        }
    }

    best
}

/// Function for a chord that may lie outside the progression map.
///
/// Dominant sevenths and roots a tritone from the tonic always act as
/// dominants.
pub fn infer_harmonic_function(chord: &Chord, key: Note, scale_type: ScaleType) -> HarmonicFunction {
    let interval = interval_from_key(chord.root, key);
    if chord.quality == ChordQuality::Dominant7 || interval == 6 {
        return HarmonicFunction::Dominant;
    }
    let (degree, _) = nearest_degree(interval, scale_type);
    function_for_degree(degree)
}

/// Conventional mark appended to a numeral for each quality.
pub fn quality_mark(quality: ChordQuality) -> &'static str {
    match quality {
        ChordQuality::Major | ChordQuality::Minor => "",
        ChordQuality::Diminished => "°",
        ChordQuality::Augmented => "+",
        ChordQuality::Dominant7 | ChordQuality::Minor7 => "7",
        ChordQuality::Major7 => "maj7",
        ChordQuality::Diminished7 => "°7",
        ChordQuality::HalfDiminished7 => "ø7",
        ChordQuality::Sus2 => "sus2",
        ChordQuality::Sus4 => "sus4",
    }
}

/// Numeral for `degree` with case and suffix from `quality`.
/// `accidental` is prefixed verbatim ("b", "#", or "").
pub fn roman_numeral(degree: usize, quality: ChordQuality, accidental: &str) -> String {
    let numeral = ROMAN_UPPER[degree % 7];
    let numeral = if quality.is_minor_family() {
        numeral.to_lowercase()
    } else {
        numeral.to_string()
    };
    format!("{}{}{}", accidental, numeral, quality_mark(quality))
}

/// Roman numeral for an arbitrary chord: on-scale roots use their degree,
/// chromatic roots the nearest degree with a "b"/"#" prefix.
pub fn infer_roman_numeral(chord: &Chord, key: Note, scale_type: ScaleType) -> String {
    let (degree, offset) = nearest_degree(interval_from_key(chord.root, key), scale_type);
    let accidental = match offset {
        o if o < 0 => "b",
        o if o > 0 => "#",
        _ => "",
    };
    roman_numeral(degree, chord.quality, accidental)
}

/// Numeral with quality marks and accidentals stripped, for comparing
/// progressions regardless of sevenths ("V7" → "V", "vii°7" → "vii").
pub fn base_numeral(numeral: &str) -> &str {
    let accidental_len = numeral.len() - numeral.trim_start_matches(|c| c == 'b' || c == '#').len();
    let rest = &numeral[accidental_len..];
    let numeral_len = rest
        .find(|c: char| !matches!(c, 'I' | 'V' | 'i' | 'v'))
        .unwrap_or(rest.len());
    &numeral[..accidental_len + numeral_len]
}

/// Heuristic instability in [0, 1].
pub fn tension_level(chord: &Chord, function: HarmonicFunction, distance: f64) -> f64 {
    let mut tension = match function {
        HarmonicFunction::Tonic => TONIC_TENSION,
        HarmonicFunction::Subdominant => SUBDOMINANT_TENSION,
        HarmonicFunction::Dominant => DOMINANT_TENSION,
    };

    if chord.quality.is_seventh() {
        tension += SEVENTH_TENSION;
    }
    if chord.quality.is_diminished() || chord.quality == ChordQuality::Augmented {
        tension += ALTERED_TENSION;
    }
    tension += DISTANCE_TENSION * distance;

    tension.min(1.0)
}

/// Tension of a node already placed in a key.
pub fn node_tension(node: &ProgressionNode, key: Note, scale_type: ScaleType) -> f64 {
    let distance = harmonic_distance(&node.chord, key, scale_type);
    tension_level(&node.chord, node.function, distance)
}

impl ProgressionNode {
    /// Place a chord that is not in the progression map, inferring its
    /// numeral and function from the nearest scale degree.
    pub fn infer(id: impl Into<String>, chord: Chord, key: Note, scale_type: ScaleType) -> Self {
        let roman_numeral = infer_roman_numeral(&chord, key, scale_type);
        let function = infer_harmonic_function(&chord, key, scale_type);
        let category = classify_color(&chord, key, scale_type);
        Self {
            id: id.into(),
            chord,
            roman_numeral,
            function,
            category,
            extensions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord_templates::generate_chord;

    fn chord(root: Note, quality: ChordQuality) -> Chord {
        generate_chord(root, quality)
    }

    #[test]
    fn diatonic_triads_have_zero_distance() {
        for (root, quality) in [
            (Note::C, ChordQuality::Major),
            (Note::D, ChordQuality::Minor),
            (Note::G, ChordQuality::Major),
            (Note::A, ChordQuality::Minor),
        ] {
            assert_eq!(harmonic_distance(&chord(root, quality), Note::C, ScaleType::Major), 0.0);
        }
    }

    #[test]
    fn distance_components_add_up() {
        // vii° in C: all scale tones, B-F tritone
        assert_eq!(
            harmonic_distance(&chord(Note::B, ChordQuality::Diminished), Note::C, ScaleType::Major),
            0.5
        );
        // Bb major in C: root out (1.0) + Bb out (0.5), no tritone
        assert_eq!(
            harmonic_distance(&chord(Note::Bb, ChordQuality::Major), Note::C, ScaleType::Major),
            1.5
        );
        // D7 in C: F# out (0.5) + F#-C tritone (0.5)
        assert_eq!(
            harmonic_distance(&chord(Note::D, ChordQuality::Dominant7), Note::C, ScaleType::Major),
            1.0
        );
        // C#dim7 in C: root out 1.0, C# and A# out 1.0, tritones 0.5
        assert_eq!(
            harmonic_distance(&chord(Note::CSharp, ChordQuality::Diminished7), Note::C, ScaleType::Major),
            2.5
        );
    }

    #[test]
    fn distance_is_zero_exactly_for_scale_tone_chords_without_tritone() {
        for key in Note::ALL {
            for scale in ScaleType::ALL {
                for root in Note::ALL {
                    for quality in ChordQuality::ALL {
                        let c = chord(root, quality);
                        let d = harmonic_distance(&c, key, scale);
                        assert!(d >= 0.0);
                        let expect_zero = all_tones_in_scale(&c, key, scale) && !c.contains_tritone();
                        assert_eq!(d == 0.0, expect_zero, "{} in {} {}", c.symbol(), key, scale);
                    }
                }
            }
        }
    }

    #[test]
    fn color_classes_in_c_major() {
        let key = Note::C;
        let scale = ScaleType::Major;
        assert_eq!(classify_color(&chord(Note::G, ChordQuality::Major), key, scale), ColorClass::Diatonic);
        assert_eq!(classify_color(&chord(Note::G, ChordQuality::Dominant7), key, scale), ColorClass::Diatonic);
        assert_eq!(classify_color(&chord(Note::B, ChordQuality::Diminished), key, scale), ColorClass::Diatonic);
        assert_eq!(
            classify_color(&chord(Note::D, ChordQuality::Dominant7), key, scale),
            ColorClass::SecondaryDominant
        );
        assert_eq!(
            classify_color(&chord(Note::CSharp, ChordQuality::Diminished7), key, scale),
            ColorClass::DiminishedPassing
        );
        assert_eq!(classify_color(&chord(Note::F, ChordQuality::Minor), key, scale), ColorClass::Borrowed);
        assert_eq!(classify_color(&chord(Note::Bb, ChordQuality::Major), key, scale), ColorClass::Borrowed);
        // right degree, wrong quality
        assert_eq!(classify_color(&chord(Note::D, ChordQuality::Major), key, scale), ColorClass::Borrowed);
        assert_eq!(classify_color(&chord(Note::C, ChordQuality::Sus4), key, scale), ColorClass::Diatonic);
    }

    #[test]
    fn minor_key_supertonic_is_diatonic() {
        assert_eq!(
            classify_color(&chord(Note::B, ChordQuality::Diminished), Note::A, ScaleType::Minor),
            ColorClass::Diatonic
        );
        assert_eq!(
            classify_color(&chord(Note::B, ChordQuality::Dominant7), Note::A, ScaleType::Minor),
            ColorClass::SecondaryDominant
        );
    }

    #[test]
    fn altered_chords_on_v_and_vii_are_borrowed() {
        // natural minor builds Em on V, so E7 is not a secondary dominant
        assert_eq!(
            classify_color(&chord(Note::E, ChordQuality::Dominant7), Note::A, ScaleType::Minor),
            ColorClass::Borrowed
        );
        // harmonic minor does build E7
        assert_eq!(
            classify_color(&chord(Note::E, ChordQuality::Dominant7), Note::A, ScaleType::HarmonicMinor),
            ColorClass::Diatonic
        );
        // vii in C major is half-diminished
        assert_eq!(
            classify_color(&chord(Note::B, ChordQuality::Diminished7), Note::C, ScaleType::Major),
            ColorClass::Borrowed
        );
        assert_eq!(
            classify_color(&chord(Note::G, ChordQuality::Diminished), Note::C, ScaleType::Major),
            ColorClass::DiminishedPassing
        );
        assert_eq!(
            classify_color(&chord(Note::GSharp, ChordQuality::Diminished7), Note::A, ScaleType::Minor),
            ColorClass::DiminishedPassing
        );
    }

    #[test]
    fn nearest_degree_breaks_ties_low() {
        // Bb in C major: A (degree 5) and B (degree 6) both one away
        assert_eq!(nearest_degree(10, ScaleType::Major), (5, 1));
        // C# in C major: C and D both one away
        assert_eq!(nearest_degree(1, ScaleType::Major), (0, 1));
        assert_eq!(nearest_degree(7, ScaleType::Major), (4, 0));
        // Eb in C major: D and E tie, lower wins
        assert_eq!(nearest_degree(3, ScaleType::Major), (1, 1));
    }

    #[test]
    fn inferred_numerals() {
        let key = Note::C;
        let scale = ScaleType::Major;
        assert_eq!(infer_roman_numeral(&chord(Note::G, ChordQuality::Dominant7), key, scale), "V7");
        assert_eq!(infer_roman_numeral(&chord(Note::A, ChordQuality::Minor), key, scale), "vi");
        assert_eq!(infer_roman_numeral(&chord(Note::B, ChordQuality::Diminished), key, scale), "vii°");
        assert_eq!(infer_roman_numeral(&chord(Note::B, ChordQuality::HalfDiminished7), key, scale), "viiø7");
        assert_eq!(infer_roman_numeral(&chord(Note::E, ChordQuality::Augmented), key, scale), "III+");
        assert_eq!(infer_roman_numeral(&chord(Note::CSharp, ChordQuality::Diminished7), key, scale), "#i°7");
        assert_eq!(infer_roman_numeral(&chord(Note::C, ChordQuality::Major), key, scale), "I");
        assert_eq!(infer_roman_numeral(&chord(Note::A, ChordQuality::Minor), Note::A, ScaleType::Minor), "i");
    }

    #[test]
    fn inferred_functions() {
        let key = Note::C;
        let scale = ScaleType::Major;
        assert_eq!(
            infer_harmonic_function(&chord(Note::A, ChordQuality::Dominant7), key, scale),
            HarmonicFunction::Dominant
        );
        assert_eq!(
            infer_harmonic_function(&chord(Note::FSharp, ChordQuality::Minor), key, scale),
            HarmonicFunction::Dominant
        );
        assert_eq!(
            infer_harmonic_function(&chord(Note::F, ChordQuality::Minor), key, scale),
            HarmonicFunction::Subdominant
        );
        assert_eq!(
            infer_harmonic_function(&chord(Note::E, ChordQuality::Minor), key, scale),
            HarmonicFunction::Tonic
        );
    }

    #[test]
    fn base_numerals_strip_marks() {
        assert_eq!(base_numeral("V7"), "V");
        assert_eq!(base_numeral("vii°7"), "vii");
        assert_eq!(base_numeral("viiø7"), "vii");
        assert_eq!(base_numeral("bVII"), "bVII");
        assert_eq!(base_numeral("Imaj7"), "I");
        assert_eq!(base_numeral("#i°7"), "#i");
        assert_eq!(base_numeral("IVsus4"), "IV");
    }

    #[test]
    fn tension_ordering() {
        let tonic = tension_level(&chord(Note::C, ChordQuality::Major), HarmonicFunction::Tonic, 0.0);
        let dom7 = tension_level(&chord(Note::G, ChordQuality::Dominant7), HarmonicFunction::Dominant, 0.5);
        assert!((tonic - 0.1).abs() < 1e-12);
        assert!((dom7 - 0.825).abs() < 1e-12);
        let capped = tension_level(&chord(Note::CSharp, ChordQuality::Diminished7), HarmonicFunction::Dominant, 2.5);
        assert_eq!(capped, 1.0);
    }
}
