use std::fmt;

use serde::{Deserialize, Serialize};

use music_theory::{ColorClass, ProgressionNode};

/// How the statistical corpus rates a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionCategory {
    Common,
    Interesting,
    Adventurous,
}

impl TransitionCategory {
    /// `common` when likely and easy, `adventurous` when rare or hard.
    pub fn classify(probability: f64, friction: f64) -> Self {
        if probability > 0.05 && friction < 0.3 {
            TransitionCategory::Common
        } else if probability < 0.01 || friction > 0.7 {
            TransitionCategory::Adventurous
        } else {
            TransitionCategory::Interesting
        }
    }
}

impl fmt::Display for TransitionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionCategory::Common => write!(f, "common"),
            TransitionCategory::Interesting => write!(f, "interesting"),
            TransitionCategory::Adventurous => write!(f, "adventurous"),
        }
    }
}

/// One observed next-chord from the corpus for the current prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalRecommendation {
    pub chord: String,
    pub probability: f64,
    /// Share of all chords in the genre, 0..1.
    pub frequency: f64,
    /// 0 = easy, 1 = never seen.
    pub friction: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<TransitionCategory>,
}

/// A mined n-gram with its share of all n-grams of that length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPattern {
    pub chords: Vec<String>,
    pub frequency: f64,
    #[serde(default)]
    pub count: u64,
}

/// Where a candidate entered the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    /// Node of the key's progression map.
    Theory,
    /// Observed in the corpus but outside the map.
    Statistical,
}

/// Explainable components of a candidate's rank.
///
/// Before hybrid scoring `total` holds the theory score (0..2); afterwards
/// it holds the weighted hybrid score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pattern_raw: f64,
    pub pattern_normalized: f64,
    pub pattern_confidence: f64,
    pub transition_strength: f64,
    pub color_class: ColorClass,
    pub harmonic_distance: f64,
    pub tension_level: f64,
    pub statistical_probability: f64,
    pub genre_frequency: Option<f64>,
    pub friction_score: Option<f64>,
    pub contextual_score: f64,
    pub category: Option<TransitionCategory>,
    pub matched_progressions: Vec<String>,
    pub source: CandidateSource,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new(color_class: ColorClass, source: CandidateSource) -> Self {
        Self {
            pattern_raw: 0.0,
            pattern_normalized: 0.0,
            pattern_confidence: 0.0,
            transition_strength: 0.0,
            color_class,
            harmonic_distance: 0.0,
            tension_level: 0.0,
            statistical_probability: 0.0,
            genre_frequency: None,
            friction_score: None,
            contextual_score: 0.0,
            category: None,
            matched_progressions: Vec::new(),
            source,
            total: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub node: ProgressionNode,
    pub breakdown: ScoreBreakdown,
}

/// Weights of the hybrid score. Expected to sum to 1.0; never renormalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridWeights {
    pub statistical: f64,
    pub harmonic: f64,
    pub voice_leading: f64,
    pub friction: f64,
    pub contextual: f64,
}

impl HybridWeights {
    pub fn sum(&self) -> f64 {
        self.statistical + self.harmonic + self.voice_leading + self.friction + self.contextual
    }

    pub fn sums_to_one(&self) -> bool {
        (self.sum() - 1.0).abs() <= 1e-6
    }
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            statistical: 0.25,
            harmonic: 0.25,
            voice_leading: 0.15,
            friction: 0.1,
            contextual: 0.25,
        }
    }
}
