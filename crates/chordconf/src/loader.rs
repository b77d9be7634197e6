//! Config file discovery, table merging, and environment overlay.

use crate::{ChordConfig, ConfigError};
use std::env;
use std::path::{Path, PathBuf};

/// Where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Existing config files in load order (system, user, local or CLI).
///
/// A `cli_path` that exists replaces `./chordwise.toml`.
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc/chordwise/config.toml");
    if system.exists() {
        files.push(system);
    }

    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("chordwise/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from("chordwise.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

pub fn read_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_table(&contents, path)
}

pub(crate) fn parse_table(contents: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Merge `overlay` into `base`. Nested tables merge key by key; any other
/// value in `overlay` replaces the one in `base`.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, incoming);
                } else {
                    base.insert(key, toml::Value::Table(incoming));
                }
            }
            other => {
                base.insert(key, other);
            }
        }
    }
}

/// Deserialize a merged table, filling gaps with defaults.
pub fn config_from_table(table: toml::Table) -> Result<ChordConfig, ConfigError> {
    let mut config: ChordConfig = toml::Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::Invalid(e.to_string()))?;

    config.paths.corpus_dir = expand_path(&config.paths.corpus_dir.to_string_lossy());
    config.paths.favorites_dir = expand_path(&config.paths.favorites_dir.to_string_lossy());
    Ok(config)
}

/// Apply `CHORDWISE_*` and `RUST_LOG` from the process environment.
pub fn apply_env_overrides(config: &mut ChordConfig, sources: &mut ConfigSources) {
    apply_overrides_from(config, sources, |name| env::var(name).ok());
}

pub(crate) fn apply_overrides_from(
    config: &mut ChordConfig,
    sources: &mut ConfigSources,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CHORDWISE_CORPUS_DIR") {
        config.paths.corpus_dir = expand_path(&v);
        sources.env_overrides.push("CHORDWISE_CORPUS_DIR".to_string());
    }
    if let Some(v) = lookup("CHORDWISE_FAVORITES_DIR") {
        config.paths.favorites_dir = expand_path(&v);
        sources.env_overrides.push("CHORDWISE_FAVORITES_DIR".to_string());
    }

    if let Some(v) = lookup("CHORDWISE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("CHORDWISE_LOG_LEVEL".to_string());
    }
    if let Some(v) = lookup("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }

    if let Some(v) = lookup("CHORDWISE_GENRE") {
        config.defaults.genre = v;
        sources.env_overrides.push("CHORDWISE_GENRE".to_string());
    }
    if let Some(v) = lookup("CHORDWISE_KEY") {
        config.defaults.key = v;
        sources.env_overrides.push("CHORDWISE_KEY".to_string());
    }
}

/// Expand `~/` and a leading `$VAR` in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        return match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(stripped),
            None => PathBuf::from(path),
        };
    }

    if let Some(stripped) = path.strip_prefix('$') {
        let (var_name, rest) = match stripped.split_once('/') {
            Some((name, rest)) => (name, Some(rest)),
            None => (stripped, None),
        };
        return match (env::var(var_name), rest) {
            (Ok(value), Some(rest)) => PathBuf::from(value).join(rest),
            (Ok(value), None) => PathBuf::from(value),
            (Err(_), _) => PathBuf::from(path),
        };
    }

    PathBuf::from(path)
}
