//! Chord-symbol grammar.
//!
//! A symbol is a root (`[A-G][#b]?`) followed by one suffix from a fixed
//! vocabulary. Anything else is [`SymbolParse::Unrecognized`]; callers that
//! consume statistical data drop those entries instead of failing.

use std::str::FromStr;

use crate::chord_templates::generate_chord;
use crate::error::TheoryError;
use crate::note::Note;
use crate::types::{Chord, ChordQuality};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedChord {
    pub root: Note,
    pub quality: ChordQuality,
}

impl ParsedChord {
    pub fn to_chord(self) -> Chord {
        generate_chord(self.root, self.quality)
    }

    /// Canonical symbol: sharp root + canonical suffix.
    pub fn canonical_symbol(&self) -> String {
        format!("{}{}", self.root.canonical(), self.quality.suffix())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolParse {
    Parsed(ParsedChord),
    Unrecognized(String),
}

impl SymbolParse {
    pub fn parsed(self) -> Option<ParsedChord> {
        match self {
            SymbolParse::Parsed(chord) => Some(chord),
            SymbolParse::Unrecognized(_) => None,
        }
    }
}

impl FromStr for ParsedChord {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_chord_symbol(s)
            .parsed()
            .ok_or_else(|| TheoryError::MalformedSymbol(s.to_string()))
    }
}

fn quality_for_suffix(suffix: &str) -> Option<ChordQuality> {
    let quality = match suffix {
        "" | "M" | "maj" => ChordQuality::Major,
        "m" | "min" | "-" => ChordQuality::Minor,
        "dim" | "°" | "o" => ChordQuality::Diminished,
        "aug" | "+" => ChordQuality::Augmented,
        "7" | "dom7" => ChordQuality::Dominant7,
        "maj7" | "M7" | "Δ" | "Δ7" => ChordQuality::Major7,
        "m7" | "min7" | "-7" => ChordQuality::Minor7,
        "dim7" | "°7" | "o7" => ChordQuality::Diminished7,
        "m7b5" | "ø" | "ø7" => ChordQuality::HalfDiminished7,
        "sus2" => ChordQuality::Sus2,
        "sus4" | "sus" => ChordQuality::Sus4,
        _ => return None,
    };
    Some(quality)
}

/// Split a symbol into its root text (1–2 chars) and the remainder.
fn split_root(symbol: &str) -> Option<(&str, &str)> {
    let first = symbol.chars().next()?;
    if !('A'..='G').contains(&first) {
        return None;
    }
    let root_len = match symbol[1..].chars().next() {
        Some('#') | Some('b') => 2,
        _ => 1,
    };
    Some(symbol.split_at(root_len))
}

pub fn parse_chord_symbol(symbol: &str) -> SymbolParse {
    let trimmed = symbol.trim();
    let parsed = split_root(trimmed).and_then(|(root, suffix)| {
        let root: Note = root.parse().ok()?;
        let quality = quality_for_suffix(suffix)?;
        Some(ParsedChord { root, quality })
    });

    match parsed {
        Some(chord) => SymbolParse::Parsed(chord),
        None => SymbolParse::Unrecognized(symbol.to_string()),
    }
}

/// The single normalization used for every chord-keyed lookup.
///
/// Parseable symbols become sharp root + canonical suffix ("Bbmin7" → "A#m7").
/// Unparseable symbols keep their suffix text with only the root
/// canonicalized ("Bb9" → "A#9"), so corpus entries outside the grammar
/// still compare enharmonically.
pub fn canonical_symbol(symbol: &str) -> String {
    match parse_chord_symbol(symbol) {
        SymbolParse::Parsed(chord) => chord.canonical_symbol(),
        SymbolParse::Unrecognized(text) => {
            let trimmed = text.trim();
            match split_root(trimmed) {
                Some((root, rest)) => match root.parse::<Note>() {
                    Ok(note) => format!("{}{}", note.canonical(), rest),
                    Err(_) => trimmed.to_string(),
                },
                None => trimmed.to_string(),
            }
        }
    }
}

/// Enharmonic-aware symbol comparison.
pub fn symbols_match(a: &str, b: &str) -> bool {
    canonical_symbol(a) == canonical_symbol(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(symbol: &str) -> ParsedChord {
        parse_chord_symbol(symbol)
            .parsed()
            .unwrap_or_else(|| panic!("{symbol} should parse"))
    }

    #[test]
    fn parses_plain_triads() {
        assert_eq!(parsed("C"), ParsedChord { root: Note::C, quality: ChordQuality::Major });
        assert_eq!(parsed("Am"), ParsedChord { root: Note::A, quality: ChordQuality::Minor });
        assert_eq!(parsed("Bb"), ParsedChord { root: Note::Bb, quality: ChordQuality::Major });
        assert_eq!(parsed("F#dim").quality, ChordQuality::Diminished);
    }

    #[test]
    fn parses_suffix_aliases() {
        assert_eq!(parsed("Gmaj7").quality, ChordQuality::Major7);
        assert_eq!(parsed("GM7").quality, ChordQuality::Major7);
        assert_eq!(parsed("Bm7b5").quality, ChordQuality::HalfDiminished7);
        assert_eq!(parsed("Bø7").quality, ChordQuality::HalfDiminished7);
        assert_eq!(parsed("C#°7").quality, ChordQuality::Diminished7);
        assert_eq!(parsed("Dsus").quality, ChordQuality::Sus4);
        assert_eq!(parsed("Eb+").quality, ChordQuality::Augmented);
    }

    #[test]
    fn flat_root_is_not_confused_with_suffix() {
        // "Bb" is a root, "b" alone after a natural is also the flat sign
        assert_eq!(parsed("Bbm").root, Note::Bb);
        assert_eq!(parsed("Bbm").quality, ChordQuality::Minor);
    }

    #[test]
    fn unknown_suffixes_are_unrecognized() {
        assert!(matches!(parse_chord_symbol("C9"), SymbolParse::Unrecognized(_)));
        assert!(matches!(parse_chord_symbol("Cadd9"), SymbolParse::Unrecognized(_)));
        assert!(matches!(parse_chord_symbol("G/B"), SymbolParse::Unrecognized(_)));
        assert!(matches!(parse_chord_symbol("H7"), SymbolParse::Unrecognized(_)));
        assert!(matches!(parse_chord_symbol(""), SymbolParse::Unrecognized(_)));
    }

    #[test]
    fn from_str_reports_malformed() {
        assert_eq!(
            "Xm".parse::<ParsedChord>(),
            Err(TheoryError::MalformedSymbol("Xm".to_string()))
        );
        assert_eq!("Dm7".parse::<ParsedChord>().map(|c| c.quality), Ok(ChordQuality::Minor7));
    }

    #[test]
    fn canonical_symbols() {
        assert_eq!(canonical_symbol("Bb"), "A#");
        assert_eq!(canonical_symbol("Bbmin7"), "A#m7");
        assert_eq!(canonical_symbol("Dbmaj"), "C#");
        assert_eq!(canonical_symbol("Eb9"), "D#9");
        assert_eq!(canonical_symbol("N.C."), "N.C.");
        assert_eq!(canonical_symbol(&canonical_symbol("Gbm7b5")), canonical_symbol("Gbm7b5"));
    }

    #[test]
    fn enharmonic_symbol_match() {
        assert!(symbols_match("A#m", "Bbm"));
        assert!(symbols_match("Gb7", "F#7"));
        assert!(!symbols_match("A#", "A#m"));
    }
}
