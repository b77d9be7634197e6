//! CLI command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use chord_corpus::{load_progressions_tsv, BuildOptions, Corpus, ExportOptions, MARKOV_FILE};
use chordconf::ChordConfig;
use favorites::{FavoritesStore, FileStorage, SavedProgression};
use music_theory::frequency::UKULELE_TUNING;
use music_theory::{
    build_progression_map, fretboard as fretboard_rows, generate_chord_named, generate_scale, Note, ScaleType,
    SpellingPreference,
};
use progression_engine::{
    EngineSettings, HybridWeights, NoStatistics, ProgressionEngine, RecommendationRequest, StatisticsSource,
};

use crate::output;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Key and scale from the command line, else from `[defaults]`.
pub fn resolve_key(config: &ChordConfig, key: Option<&str>, scale: Option<&str>) -> Result<(Note, ScaleType)> {
    let key = key.unwrap_or(config.defaults.key.as_str());
    let scale = scale.unwrap_or(config.defaults.scale.as_str());
    let key: Note = key.parse().with_context(|| format!("Invalid key '{key}'"))?;
    let scale: ScaleType = scale.parse().with_context(|| format!("Invalid scale '{scale}'"))?;
    Ok((key, scale))
}

fn spelling(config: &ChordConfig) -> Result<SpellingPreference> {
    config
        .defaults
        .spelling
        .parse()
        .context("Invalid defaults.spelling in config")
}

pub fn engine_settings(config: &ChordConfig) -> EngineSettings {
    let w = &config.scoring.weights;
    EngineSettings {
        weights: HybridWeights {
            statistical: w.statistical,
            harmonic: w.harmonic,
            voice_leading: w.voice_leading,
            friction: w.friction,
            contextual: w.contextual,
        },
        goal_bucket_size: config.scoring.goal_bucket_size,
        genre_bucket_size: config.scoring.genre_bucket_size,
        max_statistical: config.scoring.max_statistical,
    }
}

/// The on-disk corpus when one has been built, otherwise no statistics.
fn statistics_source(config: &ChordConfig) -> Result<Arc<dyn StatisticsSource>> {
    let dir = &config.paths.corpus_dir;
    if dir.join(MARKOV_FILE).exists() {
        Ok(Arc::new(Corpus::load(dir)?))
    } else {
        warn!(dir = %dir.display(), "no corpus found, ranking on theory alone");
        Ok(Arc::new(NoStatistics))
    }
}

fn load_corpus(config: &ChordConfig, genre: &str) -> Result<Corpus> {
    let corpus = Corpus::load(&config.paths.corpus_dir)?;
    if !corpus.genres().contains(&genre) {
        warn!(genre, available = ?corpus.genres(), "genre not in corpus");
    }
    Ok(corpus)
}

pub fn chord(config: &ChordConfig, root: &str, quality: &str, json: bool) -> Result<()> {
    let chord = generate_chord_named(root, quality)?;
    if json {
        return print_json(&chord);
    }
    output::chord(&chord, spelling(config)?);
    Ok(())
}

pub fn scale(root: &str, scale: &str, json: bool) -> Result<()> {
    let root: Note = root.parse()?;
    let scale_type: ScaleType = scale.parse()?;
    let scale = generate_scale(root, scale_type);
    if json {
        return print_json(&scale);
    }
    output::scale(&scale);
    Ok(())
}

pub fn map(key: Note, scale: ScaleType, json: bool) -> Result<()> {
    let map = build_progression_map(key, scale);
    if json {
        return print_json(&map);
    }
    output::progression_map(&map);
    Ok(())
}

pub fn recommend(
    config: &ChordConfig,
    key: Note,
    scale_type: ScaleType,
    genre: String,
    path: Vec<String>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let engine = ProgressionEngine::with_settings(statistics_source(config)?, engine_settings(config));
    let result = engine.recommend(&RecommendationRequest {
        key,
        scale_type,
        genre,
        path,
    });

    if json {
        return print_json(&result);
    }
    output::recommendations(&result, limit);
    Ok(())
}

pub fn stats(config: &ChordConfig, chord: &str, genre: &str, limit: usize, json: bool) -> Result<()> {
    let corpus = load_corpus(config, genre)?;
    let stats = corpus.chord_stats(chord, genre, limit);
    if json {
        return print_json(&stats);
    }
    output::chord_stats(&stats);
    Ok(())
}

pub fn patterns(config: &ChordConfig, chords: &[String], genre: &str, limit: usize, json: bool) -> Result<()> {
    let corpus = load_corpus(config, genre)?;
    if corpus.patterns.is_none() {
        bail!("Corpus at {} has no patterns file", config.paths.corpus_dir.display());
    }
    let mut patterns = corpus.patterns_after(chords, genre);
    patterns.truncate(limit);
    if json {
        return print_json(&patterns);
    }
    output::patterns(chords, &patterns);
    Ok(())
}

pub fn build_corpus(input: &Path, output_dir: &Path, min_genre_size: usize) -> Result<()> {
    let progressions = load_progressions_tsv(input)?;
    if progressions.is_empty() {
        bail!("No progressions found in {}", input.display());
    }

    let corpus = Corpus::build(&progressions, &BuildOptions::with_min_genre_size(min_genre_size));
    if corpus.genres().is_empty() {
        warn!(min_genre_size, "every genre is below the minimum size");
    }
    corpus.save(output_dir, &ExportOptions::default())?;

    info!(dir = %output_dir.display(), "corpus written");
    output::corpus_summary(&corpus, progressions.len(), output_dir);
    Ok(())
}

pub fn fretboard(frets: u8, json: bool) -> Result<()> {
    let rows = fretboard_rows(&UKULELE_TUNING, frets);
    if json {
        return print_json(&rows);
    }
    output::fretboard(&rows, frets);
    Ok(())
}

pub fn open_favorites(config: &ChordConfig) -> FavoritesStore<FileStorage> {
    FavoritesStore::init(FileStorage::new(&config.paths.favorites_dir))
}

pub fn favorites_list(store: &FavoritesStore<FileStorage>, json: bool) -> Result<()> {
    if json {
        return print_json(store.state());
    }
    output::favorites(store.items());
    Ok(())
}

pub fn favorites_save(
    store: &mut FavoritesStore<FileStorage>,
    name: String,
    key: Note,
    scale_type: ScaleType,
    genre: String,
    chords: Vec<String>,
) -> Result<()> {
    let item = store.save(
        name,
        SavedProgression {
            key,
            scale_type,
            genre,
            chords,
        },
    )?;
    output::saved(&item);
    Ok(())
}

pub fn favorites_show(store: &FavoritesStore<FileStorage>, id: &str, json: bool) -> Result<()> {
    let Some(item) = store.get(id) else {
        bail!("No favorite with id '{id}'");
    };
    if json {
        return print_json(item);
    }
    output::favorite(item);
    Ok(())
}

pub fn favorites_rename(store: &mut FavoritesStore<FileStorage>, id: &str, name: &str) -> Result<()> {
    if !store.rename(id, name)? {
        bail!("No favorite with id '{id}'");
    }
    println!("Renamed {id} to {name}");
    Ok(())
}

pub fn favorites_delete(store: &mut FavoritesStore<FileStorage>, id: &str) -> Result<()> {
    if !store.delete(id)? {
        bail!("No favorite with id '{id}'");
    }
    println!("Deleted {id}");
    Ok(())
}
