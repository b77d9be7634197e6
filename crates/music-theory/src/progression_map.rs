//! Theory-derived chord vocabulary for a key.

use std::collections::HashSet;

use tracing::debug;

use crate::chord_templates::generate_chord;
use crate::classify::{classify_color, function_for_degree, roman_numeral};
use crate::note::{display_note, Note, SpellingPreference};
use crate::scale::ScaleType;
use crate::symbol::canonical_symbol;
use crate::types::{ChordQuality, HarmonicFunction, ProgressionMap, ProgressionNode};

impl ProgressionMap {
    /// Node whose symbol matches `symbol` enharmonically.
    pub fn find(&self, symbol: &str) -> Option<&ProgressionNode> {
        let wanted = canonical_symbol(symbol);
        self.nodes.iter().find(|n| canonical_symbol(&n.id) == wanted)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.find(symbol).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct MapBuilder {
    key: Note,
    scale_type: ScaleType,
    seen: HashSet<(u8, ChordQuality)>,
    nodes: Vec<ProgressionNode>,
}

impl MapBuilder {
    fn new(key: Note, scale_type: ScaleType) -> Self {
        Self {
            key,
            scale_type,
            seen: HashSet::new(),
            nodes: Vec::new(),
        }
    }

    fn root_at(&self, interval: u8) -> Note {
        display_note(
            Note::from_index(self.key.index() + interval),
            SpellingPreference::Auto,
            Some(self.key),
            Some(self.scale_type),
        )
    }

    /// First spelling wins; enharmonic repeats are dropped.
    fn push(&mut self, interval: u8, quality: ChordQuality, numeral: String, function: HarmonicFunction) {
        let root = self.root_at(interval);
        if !self.seen.insert((root.index(), quality)) {
            return;
        }
        let chord = generate_chord(root, quality);
        let category = classify_color(&chord, self.key, self.scale_type);
        self.nodes.push(ProgressionNode {
            id: chord.symbol(),
            chord,
            roman_numeral: numeral,
            function,
            category,
            extensions: Vec::new(),
        });
    }

    fn diatonic(&mut self) {
        let intervals = *self.scale_type.intervals();
        for (degree, &interval) in intervals.iter().enumerate() {
            if let Some(quality) = self.scale_type.diatonic_triad(degree) {
                self.push(interval, quality, roman_numeral(degree, quality, ""), function_for_degree(degree));
            }
        }
        for (degree, &interval) in intervals.iter().enumerate() {
            if let Some(quality) = self.scale_type.diatonic_seventh(degree) {
                self.push(interval, quality, roman_numeral(degree, quality, ""), function_for_degree(degree));
            }
        }
    }

    /// V7/x and vii°7/x for every degree ii..vi that carries a major or minor triad.
    fn secondary(&mut self) {
        let intervals = *self.scale_type.intervals();
        for degree in 1..=5 {
            let Some(triad) = self.scale_type.diatonic_triad(degree) else {
                continue;
            };
            if !matches!(triad, ChordQuality::Major | ChordQuality::Minor) {
                continue;
            }
            let target = roman_numeral(degree, triad, "");
            let interval = intervals[degree];
            self.push(
                (interval + 7) % 12,
                ChordQuality::Dominant7,
                format!("V7/{target}"),
                HarmonicFunction::Dominant,
            );
            self.push(
                (interval + 11) % 12,
                ChordQuality::Diminished7,
                format!("vii°7/{target}"),
                HarmonicFunction::Dominant,
            );
        }
    }

    /// Triads of the parallel mode, diminished ones excluded.
    fn borrowed(&mut self) {
        let parallel = self.scale_type.parallel();
        let own = *self.scale_type.intervals();
        for (degree, &interval) in parallel.intervals().iter().enumerate() {
            let Some(quality) = parallel.diatonic_triad(degree) else {
                continue;
            };
            if quality.is_diminished() {
                continue;
            }
            let accidental = match interval.cmp(&own[degree]) {
                std::cmp::Ordering::Less => "b",
                std::cmp::Ordering::Greater => "#",
                std::cmp::Ordering::Equal => "",
            };
            self.push(
                interval,
                quality,
                roman_numeral(degree, quality, accidental),
                function_for_degree(degree),
            );
        }
    }
}

/// Every diatonic and common chromatic chord in `key`/`scale_type`:
/// diatonic triads and sevenths, secondary dominants and leading-tone
/// diminished sevenths, and parallel-mode borrowings.
pub fn build_progression_map(key: Note, scale_type: ScaleType) -> ProgressionMap {
    let mut builder = MapBuilder::new(key, scale_type);
    builder.diatonic();
    builder.secondary();
    builder.borrowed();

    debug!(%key, %scale_type, nodes = builder.nodes.len(), "built progression map");

    ProgressionMap {
        key,
        scale_type,
        nodes: builder.nodes,
    }
}
