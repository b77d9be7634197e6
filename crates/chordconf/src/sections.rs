//! Configuration sections and their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".local/share/chordwise"))
        .unwrap_or_else(|| PathBuf::from(".local/share/chordwise"))
}

/// Where the corpus and favorites live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding `markov_model.json` and `patterns.json`.
    /// Default: ~/.local/share/chordwise/corpus
    #[serde(default = "PathsConfig::default_corpus_dir")]
    pub corpus_dir: PathBuf,

    /// Default: ~/.local/share/chordwise
    #[serde(default = "PathsConfig::default_favorites_dir")]
    pub favorites_dir: PathBuf,
}

impl PathsConfig {
    fn default_corpus_dir() -> PathBuf {
        data_dir().join("corpus")
    }

    fn default_favorites_dir() -> PathBuf {
        data_dir()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            corpus_dir: Self::default_corpus_dir(),
            favorites_dir: Self::default_favorites_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or full `EnvFilter` directive.
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Hybrid score weights. Kept as written even when they don't sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightsConfig {
    pub statistical: f64,
    pub harmonic: f64,
    pub voice_leading: f64,
    pub friction: f64,
    pub contextual: f64,
}

impl WeightsConfig {
    pub fn sum(&self) -> f64 {
        self.statistical + self.harmonic + self.voice_leading + self.friction + self.contextual
    }

    fn values(&self) -> [(&'static str, f64); 5] {
        [
            ("statistical", self.statistical),
            ("harmonic", self.harmonic),
            ("voice_leading", self.voice_leading),
            ("friction", self.friction),
            ("contextual", self.contextual),
        ]
    }

    /// First weight that is negative or not finite.
    pub fn invalid_weight(&self) -> Option<(&'static str, f64)> {
        self.values().into_iter().find(|(_, w)| !w.is_finite() || *w < 0.0)
    }
}

impl Default for WeightsConfig {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: WeightsConfig,

    /// Default: 8
    #[serde(default = "ScoringConfig::default_goal_bucket_size")]
    pub goal_bucket_size: usize,

    /// Default: 20
    #[serde(default = "ScoringConfig::default_genre_bucket_size")]
    pub genre_bucket_size: usize,

    /// Corpus recommendations requested per query.
    /// Default: 20
    #[serde(default = "ScoringConfig::default_max_statistical")]
    pub max_statistical: usize,
}

impl ScoringConfig {
    fn default_goal_bucket_size() -> usize {
        8
    }

    fn default_genre_bucket_size() -> usize {
        20
    }

    fn default_max_statistical() -> usize {
        20
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            goal_bucket_size: Self::default_goal_bucket_size(),
            genre_bucket_size: Self::default_genre_bucket_size(),
            max_statistical: Self::default_max_statistical(),
        }
    }
}

/// Values used when the command line leaves them out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "DefaultsConfig::default_key")]
    pub key: String,

    #[serde(default = "DefaultsConfig::default_scale")]
    pub scale: String,

    #[serde(default = "DefaultsConfig::default_genre")]
    pub genre: String,

    /// sharp, flat or auto
    #[serde(default = "DefaultsConfig::default_spelling")]
    pub spelling: String,
}

impl DefaultsConfig {
    fn default_key() -> String {
        "C".to_string()
    }

    fn default_scale() -> String {
        "major".to_string()
    }

    fn default_genre() -> String {
        "pop".to_string()
    }

    fn default_spelling() -> String {
        "auto".to_string()
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            key: Self::default_key(),
            scale: Self::default_scale(),
            genre: Self::default_genre(),
            spelling: Self::default_spelling(),
        }
    }
}
