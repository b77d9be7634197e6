//! Dataset chord spellings to symbol-grammar spellings.
//!
//! The source data writes sharps as `s` (`Fs`, `Csmin7`), minor as `min`,
//! power chords as `no3d`, and wraps song sections in `<tags>`.

use std::fmt;

use music_theory::canonical_symbol;

/// Quality placeholder when the root can't be read.
pub const UNKNOWN_QUALITY: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordNotation {
    pub root: String,
    /// Symbol suffix; empty for major.
    pub quality: String,
    pub bass: Option<String>,
}

impl ChordNotation {
    /// Root and quality without the bass note.
    pub fn to_simple(&self) -> String {
        if self.quality == UNKNOWN_QUALITY {
            return self.root.clone();
        }
        format!("{}{}", self.root, self.quality)
    }

    pub fn is_unknown(&self) -> bool {
        self.quality == UNKNOWN_QUALITY
    }
}

impl fmt::Display for ChordNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_simple())?;
        if let Some(bass) = &self.bass {
            write!(f, "/{bass}")?;
        }
        Ok(())
    }
}

pub fn normalize_note(note: &str) -> String {
    match note {
        "Cs" => "C#",
        "Ds" => "D#",
        "Fs" => "F#",
        "Gs" => "G#",
        "As" => "A#",
        other => other,
    }
    .to_string()
}

fn normalize_quality(quality: &str) -> String {
    if quality.is_empty() {
        return String::new();
    }
    if quality.to_ascii_lowercase().contains("no3d") {
        return "5".to_string();
    }

    if let Some(rest) = quality.strip_prefix("min") {
        return match rest {
            "7" => "m7".to_string(),
            "maj7" => "mM7".to_string(),
            r if r.starts_with("add") => format!("m{r}"),
            _ => "m".to_string(),
        };
    }
    if let Some(rest) = quality.strip_prefix("dim") {
        return if rest == "7" { "dim7" } else { "dim" }.to_string();
    }
    if quality.starts_with("aug") {
        return "aug".to_string();
    }
    if quality.starts_with("sus") {
        return quality.to_string();
    }
    if let Some(rest) = quality.strip_prefix("maj") {
        return match rest {
            "7" => "maj7".to_string(),
            "9" => "maj9".to_string(),
            _ => String::new(),
        };
    }

    quality.to_string()
}

/// Split a root (`[A-G][sb]?`) off the front of `symbol`.
fn split_dataset_root(symbol: &str) -> Option<(&str, &str)> {
    let first = symbol.chars().next()?;
    if !('A'..='G').contains(&first) {
        return None;
    }
    let len = match symbol[1..].chars().next() {
        Some('s') if !symbol[1..].starts_with("sus") => 2,
        Some('b') | Some('#') => 2,
        _ => 1,
    };
    Some(symbol.split_at(len))
}

pub fn normalize_chord(symbol: &str) -> ChordNotation {
    let (body, bass) = match symbol.split_once('/') {
        Some((body, bass)) => (body, Some(normalize_note(bass))),
        None => (symbol, None),
    };

    match split_dataset_root(body) {
        Some((root, quality)) => ChordNotation {
            root: normalize_note(root),
            quality: normalize_quality(quality),
            bass,
        },
        None => ChordNotation {
            root: symbol.to_string(),
            quality: UNKNOWN_QUALITY.to_string(),
            bass: None,
        },
    }
}

/// Dataset chord to the canonical symbol every corpus table is keyed by.
pub fn normalize_chord_simple(symbol: &str) -> String {
    canonical_symbol(&normalize_chord(symbol).to_simple())
}

/// Chords of one progression line, section tags removed.
pub fn parse_progression_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter(|token| !(token.starts_with('<') && token.ends_with('>')))
        .map(normalize_chord_simple)
        .collect()
}
