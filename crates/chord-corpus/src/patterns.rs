//! Frequent chord n-grams per genre.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Progression;

pub const PATTERN_LENGTHS: [usize; 3] = [2, 3, 4];
pub const DEFAULT_TOP_PER_LENGTH: usize = 100;
pub const MAX_PATTERN_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordPattern {
    pub chords: Vec<String>,
    pub count: u64,
    /// Share of all n-grams of this length in the genre.
    pub frequency: f64,
    pub genre: String,
}

impl ChordPattern {
    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.chords.len() >= prefix.len() && self.chords.iter().zip(prefix).all(|(a, b)| a == b)
    }
}

impl fmt::Display for ChordPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chords.join(" → "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternOptions {
    pub min_genre_size: usize,
    pub top_per_length: usize,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            min_genre_size: 1000,
            top_per_length: DEFAULT_TOP_PER_LENGTH,
        }
    }
}

/// genre -> pattern length -> patterns, most frequent first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternMiner {
    patterns: BTreeMap<String, BTreeMap<usize, Vec<ChordPattern>>>,
}

impl PatternMiner {
    pub fn add_pattern(&mut self, pattern: ChordPattern) {
        self.patterns
            .entry(pattern.genre.clone())
            .or_default()
            .entry(pattern.len())
            .or_default()
            .push(pattern);
    }

    pub fn genres(&self) -> Vec<&str> {
        self.patterns.keys().map(String::as_str).collect()
    }

    /// Most frequent patterns of one length.
    pub fn get_patterns(&self, genre: &str, length: usize, top_n: usize, min_frequency: f64) -> Vec<&ChordPattern> {
        let mut found: Vec<&ChordPattern> = self
            .patterns
            .get(genre)
            .and_then(|lengths| lengths.get(&length))
            .map(|list| list.iter().filter(|p| p.frequency >= min_frequency).collect())
            .unwrap_or_default();
        found.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
        found.truncate(top_n);
        found
    }

    /// Patterns of length `prefix.len()..=max_length` that begin with
    /// `prefix`, by descending frequency. An empty prefix matches every
    /// pattern.
    pub fn find_matching_patterns(&self, prefix: &[&str], genre: &str, max_length: usize) -> Vec<&ChordPattern> {
        let Some(lengths) = self.patterns.get(genre) else {
            return Vec::new();
        };

        let mut matches: Vec<&ChordPattern> = lengths
            .range(prefix.len()..=max_length.max(prefix.len()))
            .flat_map(|(_, list)| list.iter())
            .filter(|p| p.starts_with(prefix))
            .collect();
        matches.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
        matches
    }
}

/// Count every n-gram of [`PATTERN_LENGTHS`] per genre and keep the top ones.
pub fn extract_patterns(progressions: &[Progression], options: &PatternOptions) -> PatternMiner {
    let mut by_genre: BTreeMap<&str, Vec<&Progression>> = BTreeMap::new();
    for progression in progressions {
        by_genre.entry(progression.genre.as_str()).or_default().push(progression);
    }

    let mut miner = PatternMiner::default();

    for (genre, genre_progressions) in by_genre {
        if genre_progressions.len() < options.min_genre_size {
            continue;
        }

        for length in PATTERN_LENGTHS {
            let mut counts: HashMap<&[String], u64> = HashMap::new();
            let mut total = 0u64;
            for progression in &genre_progressions {
                for window in progression.chords.windows(length) {
                    *counts.entry(window).or_default() += 1;
                    total += 1;
                }
            }

            let unique = counts.len();
            let mut ranked: Vec<(&[String], u64)> = counts.into_iter().collect();
            // ties in lexical order so repeated builds agree
            ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
            ranked.truncate(options.top_per_length);

            for (chords, count) in ranked {
                miner.add_pattern(ChordPattern {
                    chords: chords.to_vec(),
                    count,
                    frequency: if total > 0 { count as f64 / total as f64 } else { 0.0 },
                    genre: genre.to_string(),
                });
            }
            debug!(genre, length, unique, "mined patterns");
        }
        info!(genre, progressions = genre_progressions.len(), "extracted patterns");
    }

    miner
}
