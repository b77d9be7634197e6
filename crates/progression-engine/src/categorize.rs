//! Goal-oriented and genre-relative views over a ranked candidate list.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use music_theory::{ColorClass, HarmonicFunction};

use crate::types::ScoredCandidate;

pub const DEFAULT_GOAL_BUCKET_SIZE: usize = 8;
pub const DEFAULT_GENRE_BUCKET_SIZE: usize = 20;

/// Spread below which every frequency counts as the same.
const DEGENERATE_SPREAD: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalBucket {
    SafeCommon,
    TensionBuilding,
    Exploratory,
    Resolution,
}

impl GoalBucket {
    pub const ALL: [GoalBucket; 4] = [
        GoalBucket::SafeCommon,
        GoalBucket::TensionBuilding,
        GoalBucket::Exploratory,
        GoalBucket::Resolution,
    ];
}

impl fmt::Display for GoalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalBucket::SafeCommon => write!(f, "safe_common"),
            GoalBucket::TensionBuilding => write!(f, "tension_building"),
            GoalBucket::Exploratory => write!(f, "exploratory"),
            GoalBucket::Resolution => write!(f, "resolution"),
        }
    }
}

/// Every goal a candidate serves, given the tension change it would cause.
pub fn goal_tags(candidate: &ScoredCandidate, tension_delta: f64) -> BTreeSet<GoalBucket> {
    let b = &candidate.breakdown;
    let node = &candidate.node;
    let diatonic = b.color_class == ColorClass::Diatonic;
    let mut tags = BTreeSet::new();

    if (diatonic && b.harmonic_distance < 1.0 && b.pattern_confidence > 0.3)
        || (diatonic && b.transition_strength > 0.4)
    {
        tags.insert(GoalBucket::SafeCommon);
    }

    if (node.function == HarmonicFunction::Dominant && tension_delta >= -0.1)
        || b.color_class == ColorClass::SecondaryDominant
    {
        tags.insert(GoalBucket::TensionBuilding);
    }

    if (!diatonic && b.harmonic_distance >= 1.0)
        || matches!(b.color_class, ColorClass::Borrowed | ColorClass::DiminishedPassing)
    {
        tags.insert(GoalBucket::Exploratory);
    }

    if (node.function == HarmonicFunction::Tonic && tension_delta < -0.1)
        || node.roman_numeral == "I"
        || node.roman_numeral == "i"
    {
        tags.insert(GoalBucket::Resolution);
    }

    tags
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalBuckets {
    pub safe_common: Vec<ScoredCandidate>,
    pub tension_building: Vec<ScoredCandidate>,
    pub exploratory: Vec<ScoredCandidate>,
    pub resolution: Vec<ScoredCandidate>,
}

impl GoalBuckets {
    pub fn get(&self, bucket: GoalBucket) -> &[ScoredCandidate] {
        match bucket {
            GoalBucket::SafeCommon => &self.safe_common,
            GoalBucket::TensionBuilding => &self.tension_building,
            GoalBucket::Exploratory => &self.exploratory,
            GoalBucket::Resolution => &self.resolution,
        }
    }

    fn get_mut(&mut self, bucket: GoalBucket) -> &mut Vec<ScoredCandidate> {
        match bucket {
            GoalBucket::SafeCommon => &mut self.safe_common,
            GoalBucket::TensionBuilding => &mut self.tension_building,
            GoalBucket::Exploratory => &mut self.exploratory,
            GoalBucket::Resolution => &mut self.resolution,
        }
    }
}

fn sort_by_total(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.breakdown.total.total_cmp(&a.breakdown.total));
}

/// Group candidates by goal. Tension deltas are measured against
/// `baseline_tension`, the tension of the chord just played.
pub fn categorize_recommendations(
    candidates: &[ScoredCandidate],
    baseline_tension: f64,
    limit: usize,
) -> GoalBuckets {
    let mut buckets = GoalBuckets::default();

    for candidate in candidates {
        let delta = candidate.breakdown.tension_level - baseline_tension;
        for tag in goal_tags(candidate, delta) {
            buckets.get_mut(tag).push(candidate.clone());
        }
    }

    for bucket in GoalBucket::ALL {
        let list = buckets.get_mut(bucket);
        sort_by_total(list);
        list.truncate(limit);
    }

    buckets
}

/// Distribution of genre frequencies over a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencyStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
}

fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (position - lower as f64)
}

impl FrequencyStats {
    /// Stats over the positive values, or `None` when there are none.
    pub fn from_frequencies(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| *v > 0.0).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        Some(Self {
            min: sorted[0],
            max: sorted[n - 1],
            mean: sorted.iter().sum::<f64>() / n as f64,
            median: quantile(&sorted, 0.5),
            p25: quantile(&sorted, 0.25),
            p75: quantile(&sorted, 0.75),
        })
    }

    pub fn from_candidates(candidates: &[ScoredCandidate]) -> Option<Self> {
        Self::from_frequencies(candidates.iter().filter_map(|c| c.breakdown.genre_frequency))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RarityLabel {
    #[serde(rename = "Very Common")]
    VeryCommon,
    Common,
    Uncommon,
    Rare,
    Unknown,
}

impl fmt::Display for RarityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RarityLabel::VeryCommon => "Very Common",
            RarityLabel::Common => "Common",
            RarityLabel::Uncommon => "Uncommon",
            RarityLabel::Rare => "Rare",
            RarityLabel::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Rarity of `frequency` relative to the candidate set's quartiles.
pub fn get_rarity_label(frequency: Option<f64>, stats: &FrequencyStats) -> RarityLabel {
    let Some(frequency) = frequency.filter(|f| *f > 0.0) else {
        return RarityLabel::Unknown;
    };

    if stats.max - stats.min < DEGENERATE_SPREAD {
        return RarityLabel::Common;
    }

    if frequency >= stats.p75 {
        RarityLabel::VeryCommon
    } else if frequency >= stats.median {
        RarityLabel::Common
    } else if frequency >= stats.p25 {
        RarityLabel::Uncommon
    } else {
        RarityLabel::Rare
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenreBuckets {
    /// Likelier half of the candidates.
    pub canonical: Vec<ScoredCandidate>,
    /// Less likely half.
    pub spicy: Vec<ScoredCandidate>,
    pub stats: Option<FrequencyStats>,
}

impl GenreBuckets {
    pub fn rarity(&self, candidate: &ScoredCandidate) -> RarityLabel {
        match &self.stats {
            Some(stats) => get_rarity_label(candidate.breakdown.genre_frequency, stats),
            None => RarityLabel::Unknown,
        }
    }
}

/// Split candidates by statistical probability into a canonical top half
/// and a spicy bottom half, each capped at `limit`.
pub fn categorize_by_genre(candidates: &[ScoredCandidate], limit: usize) -> GenreBuckets {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| {
        b.breakdown
            .statistical_probability
            .total_cmp(&a.breakdown.statistical_probability)
    });

    let stats = FrequencyStats::from_candidates(&sorted);
    let split = sorted.len().div_ceil(2);
    let mut spicy = sorted.split_off(split);
    let mut canonical = sorted;
    canonical.truncate(limit);
    spicy.truncate(limit);

    GenreBuckets {
        canonical,
        spicy,
        stats,
    }
}
