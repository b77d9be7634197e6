//! Layered configuration for chordwise.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/chordwise/config.toml` (system)
//! 2. `~/.config/chordwise/config.toml` (user)
//! 3. `./chordwise.toml`, or the file given with `--config`
//! 4. Environment variables (`CHORDWISE_*`, `RUST_LOG`)
//!
//! Files merge table by table, so a local file can change a single weight
//! without repeating the rest of `[scoring.weights]`.
//!
//! # Example Config
//!
//! ```toml
//! [paths]
//! corpus_dir = "~/.local/share/chordwise/corpus"
//!
//! [telemetry]
//! log_level = "info"
//!
//! [scoring.weights]
//! statistical = 0.3
//! contextual = 0.2
//!
//! [defaults]
//! key = "A"
//! scale = "minor"
//! genre = "rock"
//! ```

pub mod loader;
pub mod sections;

pub use loader::{discover_config_files_with_override, expand_path, ConfigSources};
pub use sections::{DefaultsConfig, PathsConfig, ScoringConfig, TelemetryConfig, WeightsConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChordConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl ChordConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load with `config_path` standing in for `./chordwise.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources_from(config_path)?;
        Ok(config)
    }

    pub fn load_with_sources_from(config_path: Option<&Path>) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let mut table = toml::Table::new();

        for path in loader::discover_config_files_with_override(config_path) {
            loader::merge_tables(&mut table, loader::read_table(&path)?);
            sources.files.push(path);
        }

        let mut config = loader::config_from_table(table)?;
        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;

        Ok((config, sources))
    }

    /// Reject values nothing downstream can work with. Weights that merely
    /// fail to sum to 1.0 are reported by [`ChordConfig::warnings`] instead.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scoring = &self.scoring;
        if let Some((name, value)) = scoring.weights.invalid_weight() {
            return Err(ConfigError::Invalid(format!(
                "scoring.weights.{name} must be a non-negative number, got {value}"
            )));
        }
        for (name, size) in [
            ("goal_bucket_size", scoring.goal_bucket_size),
            ("genre_bucket_size", scoring.genre_bucket_size),
            ("max_statistical", scoring.max_statistical),
        ] {
            if size == 0 {
                return Err(ConfigError::Invalid(format!("scoring.{name} must be at least 1")));
            }
        }
        if self.defaults.genre.trim().is_empty() {
            return Err(ConfigError::Invalid("defaults.genre must not be empty".to_string()));
        }
        Ok(())
    }

    /// Settings that load fine but are probably not what was meant.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let sum = self.scoring.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            warnings.push(format!("scoring weights sum to {sum}, not 1.0; using them as written"));
        }
        warnings
    }

    /// Emit [`ChordConfig::warnings`] through `tracing`. Call once a
    /// subscriber is installed.
    pub fn log_warnings(&self) {
        for warning in self.warnings() {
            warn!("{warning}");
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> String {
        let mut output = String::new();
        output.push_str("# chordwise configuration\n\n");

        output.push_str("[paths]\n");
        output.push_str(&format!("corpus_dir = \"{}\"\n", self.paths.corpus_dir.display()));
        output.push_str(&format!("favorites_dir = \"{}\"\n", self.paths.favorites_dir.display()));

        output.push_str("\n[telemetry]\n");
        output.push_str(&format!("log_level = \"{}\"\n", self.telemetry.log_level));

        output.push_str("\n[scoring]\n");
        output.push_str(&format!("goal_bucket_size = {}\n", self.scoring.goal_bucket_size));
        output.push_str(&format!("genre_bucket_size = {}\n", self.scoring.genre_bucket_size));
        output.push_str(&format!("max_statistical = {}\n", self.scoring.max_statistical));

        let w = &self.scoring.weights;
        output.push_str("\n[scoring.weights]\n");
        output.push_str(&format!("statistical = {:?}\n", w.statistical));
        output.push_str(&format!("harmonic = {:?}\n", w.harmonic));
        output.push_str(&format!("voice_leading = {:?}\n", w.voice_leading));
        output.push_str(&format!("friction = {:?}\n", w.friction));
        output.push_str(&format!("contextual = {:?}\n", w.contextual));

        output.push_str("\n[defaults]\n");
        output.push_str(&format!("key = \"{}\"\n", self.defaults.key));
        output.push_str(&format!("scale = \"{}\"\n", self.defaults.scale));
        output.push_str(&format!("genre = \"{}\"\n", self.defaults.genre));
        output.push_str(&format!("spelling = \"{}\"\n", self.defaults.spelling));

        output
    }
}
