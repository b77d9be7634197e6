//! Multi-order Markov transitions per genre.
//!
//! Order 1 is P(next | current), order 2 P(next | prev, current) and
//! order 3 P(next | prev2, prev1, current). Higher-order contexts are keyed
//! by joining the chords with [`CONTEXT_SEP`]. Queries back off from the
//! longest context that has data.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Progression;

pub const CONTEXT_SEP: &str = "|";

/// context key -> next chord -> probability
pub type TransitionTable = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkovOptions {
    /// Genres with fewer progressions are skipped.
    pub min_genre_size: usize,
    /// Bigram contexts seen fewer times are dropped.
    pub min_bigram_count: u64,
    pub min_trigram_count: u64,
}

impl Default for MarkovOptions {
    fn default() -> Self {
        Self {
            min_genre_size: 1000,
            min_bigram_count: 3,
            min_trigram_count: 2,
        }
    }
}

/// Pruning applied when the model is written out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Per context, for orders 2 and 3 only.
    pub max_per_context: usize,
    pub precision: i32,
    pub min_probability: f64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            max_per_context: 15,
            precision: 4,
            min_probability: 0.005,
        }
    }
}

/// One queried transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Context the answer came from ("G", "C|G", ...).
    pub from: String,
    pub to: String,
    pub probability: f64,
    /// Probability scaled by the genre's progression count.
    pub count: u64,
}

pub const DEFAULT_MIN_PROBABILITY: f64 = 0.001;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkovModel {
    /// genre -> order-1 table
    pub transitions: BTreeMap<String, TransitionTable>,
    #[serde(default)]
    pub bigram_transitions: BTreeMap<String, TransitionTable>,
    #[serde(default)]
    pub trigram_transitions: BTreeMap<String, TransitionTable>,
    /// genre -> chord -> share of all chords in the genre
    pub chord_frequencies: BTreeMap<String, BTreeMap<String, f64>>,
    /// genre -> number of progressions
    #[serde(default)]
    pub genre_totals: BTreeMap<String, u64>,
}

fn context_key(chords: &[&str]) -> String {
    chords.join(CONTEXT_SEP)
}

#[derive(Default)]
struct Counts {
    next: HashMap<String, HashMap<String, u64>>,
    totals: HashMap<String, u64>,
}

impl Counts {
    fn add(&mut self, context: String, next: &str) {
        *self.totals.entry(context.clone()).or_default() += 1;
        *self
            .next
            .entry(context)
            .or_default()
            .entry(next.to_string())
            .or_default() += 1;
    }

    /// Normalize every context seen at least `min_count` times.
    fn into_table(self, min_count: u64) -> TransitionTable {
        let mut table = TransitionTable::new();
        for (context, nexts) in self.next {
            let total = self.totals.get(&context).copied().unwrap_or(0);
            if total < min_count || total == 0 {
                continue;
            }
            let row = nexts
                .into_iter()
                .map(|(chord, count)| (chord, count as f64 / total as f64))
                .collect();
            table.insert(context, row);
        }
        table
    }
}

impl MarkovModel {
    /// Count transitions of every order for each sufficiently large genre.
    pub fn build(progressions: &[Progression], options: &MarkovOptions) -> Self {
        let mut by_genre: BTreeMap<&str, Vec<&Progression>> = BTreeMap::new();
        for progression in progressions {
            by_genre.entry(progression.genre.as_str()).or_default().push(progression);
        }

        let mut model = MarkovModel::default();

        for (genre, genre_progressions) in by_genre {
            if genre_progressions.len() < options.min_genre_size {
                debug!(genre, progressions = genre_progressions.len(), "skipping small genre");
                continue;
            }

            let mut unigram = Counts::default();
            let mut bigram = Counts::default();
            let mut trigram = Counts::default();
            let mut chord_counts: HashMap<&str, u64> = HashMap::new();
            let mut total_chords = 0u64;

            for progression in &genre_progressions {
                let chords: Vec<&str> = progression.chords.iter().map(String::as_str).collect();
                if chords.len() < 2 {
                    continue;
                }

                for i in 0..chords.len() - 1 {
                    let next = chords[i + 1];
                    unigram.add(chords[i].to_string(), next);
                    if i >= 1 {
                        bigram.add(context_key(&chords[i - 1..=i]), next);
                    }
                    if i >= 2 {
                        trigram.add(context_key(&chords[i - 2..=i]), next);
                    }
                }

                for &chord in &chords {
                    *chord_counts.entry(chord).or_default() += 1;
                    total_chords += 1;
                }
            }

            let frequencies = chord_counts
                .into_iter()
                .map(|(chord, count)| (chord.to_string(), count as f64 / total_chords.max(1) as f64))
                .collect::<BTreeMap<_, _>>();

            let order1 = unigram.into_table(1);
            let order2 = bigram.into_table(options.min_bigram_count);
            let order3 = trigram.into_table(options.min_trigram_count);

            info!(
                genre,
                progressions = genre_progressions.len(),
                chords = frequencies.len(),
                order1 = order1.len(),
                order2 = order2.len(),
                order3 = order3.len(),
                "built transitions"
            );

            model.transitions.insert(genre.to_string(), order1);
            model.bigram_transitions.insert(genre.to_string(), order2);
            model.trigram_transitions.insert(genre.to_string(), order3);
            model.chord_frequencies.insert(genre.to_string(), frequencies);
            model.genre_totals.insert(genre.to_string(), genre_progressions.len() as u64);
        }

        model
    }

    pub fn genres(&self) -> Vec<&str> {
        self.transitions.keys().map(String::as_str).collect()
    }

    /// Most probable next chords after `current`, using up to two chords of
    /// `context` (most recent last) when higher-order data exists.
    pub fn recommendations(
        &self,
        current: &str,
        context: &[&str],
        genre: &str,
        top_n: usize,
        min_probability: f64,
    ) -> Vec<Transition> {
        let mut attempts: Vec<(&BTreeMap<String, TransitionTable>, String)> = Vec::with_capacity(3);
        if let [.., prev2, prev1] = context {
            attempts.push((&self.trigram_transitions, context_key(&[*prev2, *prev1, current])));
        }
        if let Some(prev) = context.last() {
            attempts.push((&self.bigram_transitions, context_key(&[*prev, current])));
        }
        attempts.push((&self.transitions, current.to_string()));

        let Some((from, row)) = attempts.into_iter().find_map(|(tables, key)| {
            tables
                .get(genre)
                .and_then(|table| table.get(&key))
                .map(|row| (key, row))
        }) else {
            return Vec::new();
        };

        let scale = self.genre_totals.get(genre).copied().unwrap_or(1000) as f64;
        let mut results: Vec<Transition> = row
            .iter()
            .filter(|(_, p)| **p >= min_probability)
            .map(|(to, p)| Transition {
                from: from.clone(),
                to: to.clone(),
                probability: *p,
                count: (p * scale) as u64,
            })
            .collect();

        results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        results.truncate(top_n);
        results
    }

    /// Share of all chords in `genre`; 0 when unseen.
    pub fn chord_frequency(&self, chord: &str, genre: &str) -> f64 {
        self.chord_frequencies
            .get(genre)
            .and_then(|f| f.get(chord))
            .copied()
            .unwrap_or(0.0)
    }

    /// 0 for very common chords, 1 for unseen ones.
    pub fn friction(&self, chord: &str, genre: &str) -> f64 {
        let frequency = self.chord_frequency(chord, genre);
        if frequency == 0.0 {
            return 1.0;
        }
        1.0 - (frequency * 10.0).min(1.0)
    }

    /// Chords of `genre` by descending frequency.
    pub fn ranked_chords(&self, genre: &str) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .chord_frequencies
            .get(genre)
            .map(|f| f.iter().map(|(c, p)| (c.as_str(), *p)).collect())
            .unwrap_or_default();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    /// Compact copy for writing: rows filtered by minimum probability and
    /// rounded; orders 2 and 3 also keep only their top rows.
    pub fn pruned(&self, options: &ExportOptions) -> Self {
        let factor = 10f64.powi(options.precision);
        let prune = |tables: &BTreeMap<String, TransitionTable>, limit: Option<usize>| {
            tables
                .iter()
                .map(|(genre, table)| {
                    let table = table
                        .iter()
                        .filter_map(|(context, row)| {
                            let mut kept: Vec<(&String, f64)> = row
                                .iter()
                                .filter(|(_, p)| **p >= options.min_probability)
                                .map(|(chord, p)| (chord, (p * factor).round() / factor))
                                .collect();
                            if kept.is_empty() {
                                return None;
                            }
                            if let Some(limit) = limit {
                                kept.sort_by(|a, b| b.1.total_cmp(&a.1));
                                kept.truncate(limit);
                            }
                            let row = kept.into_iter().map(|(c, p)| (c.clone(), p)).collect();
                            Some((context.clone(), row))
                        })
                        .collect();
                    (genre.clone(), table)
                })
                .collect()
        };

        Self {
            transitions: prune(&self.transitions, None),
            bigram_transitions: prune(&self.bigram_transitions, Some(options.max_per_context)),
            trigram_transitions: prune(&self.trigram_transitions, Some(options.max_per_context)),
            chord_frequencies: self.chord_frequencies.clone(),
            genre_totals: self.genre_totals.clone(),
        }
    }
}
