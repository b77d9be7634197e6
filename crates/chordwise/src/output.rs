//! Human-readable terminal output.

use std::path::Path;

use owo_colors::OwoColorize;

use chord_corpus::{ChordStats, Corpus};
use favorites::FavoriteItem;
use music_theory::{display_note, Chord, ColorClass, FretPosition, ProgressionMap, Scale, SpellingPreference};
use progression_engine::{ContextPattern, GoalBucket, Recommendations, ScoredCandidate, TransitionCategory};

fn color_label(class: ColorClass) -> String {
    let label = class.to_string();
    match class {
        ColorClass::Diatonic => label.green().to_string(),
        ColorClass::SecondaryDominant => label.yellow().to_string(),
        ColorClass::DiminishedPassing => label.magenta().to_string(),
        ColorClass::Borrowed => label.cyan().to_string(),
    }
}

fn category_label(category: Option<TransitionCategory>) -> String {
    match category {
        Some(TransitionCategory::Common) => "common".green().to_string(),
        Some(TransitionCategory::Interesting) => "interesting".yellow().to_string(),
        Some(TransitionCategory::Adventurous) => "adventurous".red().to_string(),
        None => "-".dimmed().to_string(),
    }
}

fn join_notes(notes: impl IntoIterator<Item = impl ToString>) -> String {
    notes.into_iter().map(|n| n.to_string()).collect::<Vec<_>>().join(" ")
}

pub fn chord(chord: &Chord, spelling: SpellingPreference) {
    let notes = chord
        .notes
        .iter()
        .map(|&n| display_note(n, spelling, Some(chord.root), None));
    println!("{}  {}", chord.symbol().bright_green().bold(), chord.quality.name().dimmed());
    println!("  notes:     {}", join_notes(notes));
    println!("  intervals: {}", join_notes(&chord.intervals));
}

pub fn scale(scale: &Scale) {
    println!("{} {}", scale.root.bright_green().bold(), scale.scale_type.bright_white());
    println!("  {}", join_notes(&scale.notes));
}

pub fn progression_map(map: &ProgressionMap) {
    println!("{}", format!("{} {}", map.key, map.scale_type).bright_cyan().bold());
    for node in &map.nodes {
        println!(
            "  {:<8} {:<8} {:<12} {}",
            node.id.bold(),
            node.roman_numeral,
            node.function.to_string(),
            color_label(node.category)
        );
    }
}

fn candidate_line(rank: usize, candidate: &ScoredCandidate) -> String {
    let b = &candidate.breakdown;
    let mut line = format!(
        "{:>3}. {:<8} {:<8} {:.3}  p={:.3}",
        rank,
        candidate.node.id.bold(),
        candidate.node.roman_numeral,
        b.total,
        b.statistical_probability
    );
    if let Some(friction) = b.friction_score {
        line.push_str(&format!(" friction={friction:.2}"));
    }
    line.push_str(&format!("  {}", color_label(b.color_class)));
    if !b.matched_progressions.is_empty() {
        line.push_str(&format!("  [{}]", b.matched_progressions.join(", ").dimmed()));
    }
    line
}

fn ids(candidates: &[ScoredCandidate]) -> String {
    if candidates.is_empty() {
        return "-".dimmed().to_string();
    }
    candidates.iter().map(|c| c.node.id.as_str()).collect::<Vec<_>>().join(" ")
}

pub fn recommendations(result: &Recommendations, limit: usize) {
    println!(
        "{}",
        format!("Next chords in {} {} ({})", result.key, result.scale_type, result.genre)
            .bright_cyan()
            .bold()
    );
    for (i, candidate) in result.ranked.iter().take(limit).enumerate() {
        println!("{}", candidate_line(i + 1, candidate));
    }

    println!("\n{}", "By goal".bright_white().bold());
    for bucket in GoalBucket::ALL {
        println!("  {:<17} {}", bucket.to_string(), ids(result.by_goal.get(bucket)));
    }

    println!("\n{}", "By genre".bright_white().bold());
    println!("  {:<17} {}", "canonical", ids(&result.by_genre.canonical));
    println!("  {:<17} {}", "spicy", ids(&result.by_genre.spicy));
    if result.by_genre.stats.is_some() {
        for candidate in result.by_genre.canonical.iter().chain(&result.by_genre.spicy).take(limit) {
            println!("  {:<8} {}", candidate.node.id, result.by_genre.rarity(candidate).dimmed());
        }
    }
}

pub fn chord_stats(stats: &ChordStats) {
    println!("{} in {}", stats.chord.bright_green().bold(), stats.genre.bright_white());
    println!("  frequency: {:.4}", stats.frequency);
    println!("  friction:  {:.2}", stats.friction);
    if stats.next.is_empty() {
        println!("  {}", "no recorded transitions".dimmed());
        return;
    }
    println!("  next:");
    for rec in &stats.next {
        println!(
            "    {:<8} {:.3}  {}",
            rec.chord.bold(),
            rec.probability,
            category_label(rec.category)
        );
    }
}

pub fn patterns(prefix: &[String], patterns: &[ContextPattern]) {
    println!("{} {}", "Patterns starting".bright_cyan(), prefix.join(" ").bold());
    if patterns.is_empty() {
        println!("  {}", "none".dimmed());
    }
    for pattern in patterns {
        println!(
            "  {:<24} {:.4}  ({}x)",
            pattern.chords.join(" → "),
            pattern.frequency,
            pattern.count
        );
    }
}

pub fn corpus_summary(corpus: &Corpus, progressions: usize, dir: &Path) {
    println!(
        "{} {} progressions into {}",
        "Built".bright_green().bold(),
        progressions,
        dir.display()
    );
    for genre in corpus.genres() {
        let chords = corpus.markov.chord_frequencies.get(genre).map_or(0, |f| f.len());
        println!("  {:<16} {} chords", genre, chords);
    }
}

pub fn fretboard(rows: &[FretPosition], frets: u8) {
    for string in rows.iter().filter(|r| r.fret == 0) {
        println!("{}", format!("{} string", string.string).bright_cyan().bold());
        for row in rows.iter().filter(|r| r.string == string.string) {
            let label = if row.fret == 0 { "open".to_string() } else { format!("fret {}", row.fret) };
            println!("  {:<8} {:<3} {:>8.2} Hz", label, row.note, row.frequency_hz);
        }
    }
    println!("{}", format!("{} frets", frets).dimmed());
}

fn favorite_summary(item: &FavoriteItem) -> String {
    format!(
        "{}  {}  {} {} {}",
        item.id.dimmed(),
        item.name.bold(),
        item.data.key,
        item.data.scale_type,
        item.data.chords.join(" ")
    )
}

pub fn favorites(items: &[FavoriteItem]) {
    if items.is_empty() {
        println!("{}", "No saved progressions".dimmed());
        return;
    }
    for item in items {
        println!("{}", favorite_summary(item));
    }
}

pub fn saved(item: &FavoriteItem) {
    println!("{} {}", "Saved".bright_green().bold(), item.id);
}

pub fn favorite(item: &FavoriteItem) {
    println!("{}", item.name.bright_green().bold());
    println!("  id:      {}", item.id);
    println!("  created: {}", item.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  key:     {} {}", item.data.key, item.data.scale_type);
    println!("  genre:   {}", item.data.genre);
    println!("  chords:  {}", item.data.chords.join(" "));
}
