//! The built corpus: Markov model plus mined patterns, on disk as JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use music_theory::canonical_symbol;
use progression_engine::{ContextPattern, StatisticalRecommendation, StatisticsSource, TransitionCategory};

use crate::markov::{ExportOptions, MarkovModel, MarkovOptions, DEFAULT_MIN_PROBABILITY};
use crate::normalize::parse_progression_line;
use crate::patterns::{extract_patterns, PatternMiner, PatternOptions, MAX_PATTERN_LENGTH};

pub const MARKOV_FILE: &str = "markov_model.json";
pub const PATTERNS_FILE: &str = "patterns.json";

/// One song's chord sequence, in canonical symbols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    pub genre: String,
    pub chords: Vec<String>,
}

/// Read `genre<TAB>progression` lines. Blank lines and `#` comments are
/// skipped, as are lines without a tab or without chords.
pub fn load_progressions_tsv(path: &Path) -> Result<Vec<Progression>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_progressions_tsv(&text))
}

pub fn parse_progressions_tsv(text: &str) -> Vec<Progression> {
    let mut progressions = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let Some((genre, body)) = line.split_once('\t') else {
            debug!(line = number + 1, "no tab separator, skipping");
            continue;
        };
        let chords = parse_progression_line(body);
        if chords.is_empty() {
            continue;
        }
        progressions.push(Progression {
            genre: genre.trim().to_string(),
            chords,
        });
    }
    progressions
}

/// Statistics for one chord in one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChordStats {
    pub chord: String,
    pub genre: String,
    pub frequency: f64,
    pub friction: f64,
    pub next: Vec<StatisticalRecommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BuildOptions {
    pub markov: MarkovOptions,
    pub patterns: PatternOptions,
}

impl BuildOptions {
    /// Same genre threshold for both models.
    pub fn with_min_genre_size(min_genre_size: usize) -> Self {
        Self {
            markov: MarkovOptions {
                min_genre_size,
                ..Default::default()
            },
            patterns: PatternOptions {
                min_genre_size,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub markov: MarkovModel,
    /// `None` disables pattern matching.
    pub patterns: Option<PatternMiner>,
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value).context("serializing corpus")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("renaming {} into place", tmp.display()))?;
    Ok(())
}

impl Corpus {
    pub fn build(progressions: &[Progression], options: &BuildOptions) -> Self {
        let markov = MarkovModel::build(progressions, &options.markov);
        let patterns = extract_patterns(progressions, &options.patterns);
        info!(
            progressions = progressions.len(),
            genres = markov.genres().len(),
            "corpus built"
        );
        Self {
            markov,
            patterns: Some(patterns),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let markov_path = dir.join(MARKOV_FILE);
        let text = fs::read_to_string(&markov_path)
            .with_context(|| format!("no corpus at {} (run build-corpus first)", markov_path.display()))?;
        let markov: MarkovModel =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", markov_path.display()))?;

        let patterns_path = dir.join(PATTERNS_FILE);
        let patterns = if patterns_path.exists() {
            let text = fs::read_to_string(&patterns_path)
                .with_context(|| format!("reading {}", patterns_path.display()))?;
            let miner: PatternMiner =
                serde_json::from_str(&text).with_context(|| format!("parsing {}", patterns_path.display()))?;
            Some(miner)
        } else {
            warn!(path = %patterns_path.display(), "patterns not found, pattern matching disabled");
            None
        };

        info!(dir = %dir.display(), genres = markov.genres().len(), "corpus loaded");
        Ok(Self { markov, patterns })
    }

    /// Write the pruned model and the patterns into `dir`.
    pub fn save(&self, dir: &Path, options: &ExportOptions) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        write_json_atomic(&dir.join(MARKOV_FILE), &self.markov.pruned(options))?;
        if let Some(patterns) = &self.patterns {
            write_json_atomic(&dir.join(PATTERNS_FILE), patterns)?;
        }
        info!(dir = %dir.display(), "corpus saved");
        Ok(())
    }

    pub fn genres(&self) -> Vec<&str> {
        self.markov.genres()
    }

    fn recommendation(&self, chord: &str, probability: f64, genre: &str) -> StatisticalRecommendation {
        let friction = self.markov.friction(chord, genre);
        StatisticalRecommendation {
            chord: chord.to_string(),
            probability,
            frequency: self.markov.chord_frequency(chord, genre),
            friction,
            category: Some(TransitionCategory::classify(probability, friction)),
        }
    }

    /// Next-chord statistics after `path`. With an empty path the genre's
    /// most frequent chords are returned, weighted by frequency.
    pub fn next_chords(&self, path: &[String], genre: &str, limit: usize) -> Vec<StatisticalRecommendation> {
        let path: Vec<String> = path.iter().map(|c| canonical_symbol(c)).collect();
        let Some((current, context)) = path.split_last() else {
            return self
                .markov
                .ranked_chords(genre)
                .into_iter()
                .take(limit)
                .map(|(chord, frequency)| self.recommendation(chord, frequency, genre))
                .collect();
        };

        let context: Vec<&str> = context.iter().map(String::as_str).collect();
        self.markov
            .recommendations(current, &context, genre, limit, DEFAULT_MIN_PROBABILITY)
            .into_iter()
            .map(|t| self.recommendation(&t.to, t.probability, genre))
            .collect()
    }

    pub fn chord_stats(&self, chord: &str, genre: &str, limit: usize) -> ChordStats {
        let chord = canonical_symbol(chord);
        ChordStats {
            frequency: self.markov.chord_frequency(&chord, genre),
            friction: self.markov.friction(&chord, genre),
            next: self.next_chords(std::slice::from_ref(&chord), genre, limit),
            genre: genre.to_string(),
            chord,
        }
    }

    /// Mined patterns that begin with `path`.
    pub fn patterns_after(&self, path: &[String], genre: &str) -> Vec<ContextPattern> {
        let Some(miner) = &self.patterns else {
            return Vec::new();
        };
        let prefix: Vec<String> = path.iter().map(|c| canonical_symbol(c)).collect();
        let prefix: Vec<&str> = prefix.iter().map(String::as_str).collect();
        miner
            .find_matching_patterns(&prefix, genre, MAX_PATTERN_LENGTH)
            .into_iter()
            .map(|p| ContextPattern {
                chords: p.chords.clone(),
                frequency: p.frequency,
                count: p.count,
            })
            .collect()
    }
}

impl StatisticsSource for Corpus {
    fn recommendations(&self, path: &[String], genre: &str, limit: usize) -> Vec<StatisticalRecommendation> {
        self.next_chords(path, genre, limit)
    }

    fn matching_patterns(&self, path: &[String], genre: &str) -> Vec<ContextPattern> {
        self.patterns_after(path, genre)
    }
}
