//! chordwise - chord progression explorer
//!
//! Subcommands:
//! - `chordwise chord <root> <quality>` - Spell a chord
//! - `chordwise recommend [chords...]` - Rank next chords for a progression
//! - `chordwise build-corpus --input <tsv>` - Mine statistics from a song list
//! - `chordwise favorites ...` - Manage saved progressions

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chordconf::ChordConfig;

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "chordwise")]
#[command(about = "Chord progression explorer")]
#[command(version)]
struct Cli {
    /// Config file used instead of ./chordwise.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spell a chord from root and quality
    Chord {
        /// Root note (e.g., C, F#, Bb)
        root: String,

        /// Quality name (major, minor7, half-diminished7, ...)
        quality: String,

        #[arg(long)]
        json: bool,
    },

    /// Spell a scale
    Scale {
        root: String,

        /// Scale type (major, minor, dorian, harmonic_minor, ...)
        scale: String,

        #[arg(long)]
        json: bool,
    },

    /// Show every chord usable in a key
    Map {
        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        scale: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Rank next chords for a progression
    Recommend {
        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        scale: Option<String>,

        #[arg(short, long)]
        genre: Option<String>,

        /// How many ranked chords to print
        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,

        /// Chords played so far
        chords: Vec<String>,
    },

    /// Corpus statistics for one chord
    Stats {
        chord: String,

        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Mined patterns that start with the given chords
    Patterns {
        #[arg(required = true)]
        chords: Vec<String>,

        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short, long, default_value = "10")]
        limit: usize,

        #[arg(long)]
        json: bool,
    },

    /// Build the corpus from `genre<TAB>progression` lines
    BuildCorpus {
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory (defaults to paths.corpus_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Genres with fewer progressions are skipped
        #[arg(long, default_value = "1000")]
        min_genre_size: usize,
    },

    /// Ukulele fretboard frequencies
    Fretboard {
        #[arg(short, long, default_value = "12")]
        frets: u8,

        #[arg(long)]
        json: bool,
    },

    /// Manage saved progressions
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List saved progressions
    List {
        #[arg(long)]
        json: bool,
    },

    /// Save a progression
    Save {
        name: String,

        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        scale: Option<String>,

        #[arg(short, long)]
        genre: Option<String>,

        #[arg(required = true)]
        chords: Vec<String>,
    },

    /// Show one saved progression
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Rename a saved progression
    Rename { id: String, name: String },

    /// Delete a saved progression
    Delete { id: String },
}

fn init_tracing(config: &ChordConfig) {
    let filter = EnvFilter::try_new(&config.telemetry.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ChordConfig::load_from(cli.config.as_deref())?;
    init_tracing(&config);
    config.log_warnings();

    match cli.command {
        Commands::Chord { root, quality, json } => commands::chord(&config, &root, &quality, json),
        Commands::Scale { root, scale, json } => commands::scale(&root, &scale, json),
        Commands::Map { key, scale, json } => {
            let (key, scale) = commands::resolve_key(&config, key.as_deref(), scale.as_deref())?;
            commands::map(key, scale, json)
        }
        Commands::Recommend {
            key,
            scale,
            genre,
            limit,
            json,
            chords,
        } => {
            let (key, scale) = commands::resolve_key(&config, key.as_deref(), scale.as_deref())?;
            let genre = genre.unwrap_or_else(|| config.defaults.genre.clone());
            commands::recommend(&config, key, scale, genre, chords, limit, json)
        }
        Commands::Stats {
            chord,
            genre,
            limit,
            json,
        } => {
            let genre = genre.unwrap_or_else(|| config.defaults.genre.clone());
            commands::stats(&config, &chord, &genre, limit, json)
        }
        Commands::Patterns {
            chords,
            genre,
            limit,
            json,
        } => {
            let genre = genre.unwrap_or_else(|| config.defaults.genre.clone());
            commands::patterns(&config, &chords, &genre, limit, json)
        }
        Commands::BuildCorpus {
            input,
            output,
            min_genre_size,
        } => {
            let output = output.unwrap_or_else(|| config.paths.corpus_dir.clone());
            commands::build_corpus(&input, &output, min_genre_size)
        }
        Commands::Fretboard { frets, json } => commands::fretboard(frets, json),
        Commands::Favorites { action } => {
            let mut store = commands::open_favorites(&config);
            match action {
                FavoritesAction::List { json } => commands::favorites_list(&store, json),
                FavoritesAction::Save {
                    name,
                    key,
                    scale,
                    genre,
                    chords,
                } => {
                    let (key, scale) = commands::resolve_key(&config, key.as_deref(), scale.as_deref())?;
                    let genre = genre.unwrap_or_else(|| config.defaults.genre.clone());
                    commands::favorites_save(&mut store, name, key, scale, genre, chords)
                }
                FavoritesAction::Show { id, json } => commands::favorites_show(&store, &id, json),
                FavoritesAction::Rename { id, name } => commands::favorites_rename(&mut store, &id, &name),
                FavoritesAction::Delete { id } => commands::favorites_delete(&mut store, &id),
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml());
            Ok(())
        }
    }
}
