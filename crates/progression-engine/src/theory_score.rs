//! Pre-hybrid theory score: pattern fit, voice-leading transition
//! strength, and closeness to the key.

use tracing::debug;

use music_theory::classify::base_numeral;
use music_theory::{
    harmonic_distance, node_tension, parse_chord_symbol, HarmonicFunction, ProgressionMap,
    ProgressionNode, SymbolParse,
};

use crate::patterns::{NamedProgression, PROGRESSIONS};
use crate::types::{CandidateSource, ScoreBreakdown, ScoredCandidate};

/// Raw pattern score a template earns for opening an empty progression.
pub const OPENING_SCORE: f64 = 0.5;

pub const PATTERN_WEIGHT: f64 = 1.0;
pub const TRANSITION_WEIGHT: f64 = 0.6;
pub const CLOSENESS_WEIGHT: f64 = 0.4;
/// Harmonic distance at which closeness reaches zero.
pub const CLOSENESS_HORIZON: f64 = 3.0;

/// Tension an empty progression is measured against (a plain tonic).
pub const BASELINE_TENSION: f64 = 0.1;

const COMMON_TONE_WEIGHT: f64 = 0.5;
const LEADING_TONE_BONUS: f64 = 0.1;

/// The progression so far, resolved against a key's map.
pub struct TheoryContext<'a> {
    pub map: &'a ProgressionMap,
    pub path: Vec<ProgressionNode>,
}

impl<'a> TheoryContext<'a> {
    /// Resolve chord symbols to nodes: map nodes when present, inferred
    /// nodes otherwise. Unparseable symbols are skipped.
    pub fn new(map: &'a ProgressionMap, path: &[String]) -> Self {
        let path = path
            .iter()
            .filter_map(|symbol| {
                if let Some(node) = map.find(symbol) {
                    return Some(node.clone());
                }
                match parse_chord_symbol(symbol) {
                    SymbolParse::Parsed(parsed) => Some(ProgressionNode::infer(
                        parsed.canonical_symbol(),
                        parsed.to_chord(),
                        map.key,
                        map.scale_type,
                    )),
                    SymbolParse::Unrecognized(text) => {
                        debug!(symbol = %text, "skipping unparseable path chord");
                        None
                    }
                }
            })
            .collect();

        Self { map, path }
    }

    pub fn previous(&self) -> Option<&ProgressionNode> {
        self.path.last()
    }

    pub fn path_numerals(&self) -> Vec<&str> {
        self.path.iter().map(|n| base_numeral(&n.roman_numeral)).collect()
    }

    /// Tension of the last chord, or a tonic's when nothing is played yet.
    pub fn baseline_tension(&self) -> f64 {
        self.previous()
            .map(|n| node_tension(n, self.map.key, self.map.scale_type))
            .unwrap_or(BASELINE_TENSION)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternMatch {
    pub raw: f64,
    pub confidence: f64,
    pub names: Vec<String>,
}

/// Longest suffix of `path` that runs through `template` (cyclically) and
/// is followed there by `candidate`.
fn longest_run(path: &[&str], candidate: &str, template: &NamedProgression) -> usize {
    let len = template.numerals.len();
    let max_k = path.len().min(len - 1);
    let mut best = 0;

    for start in 0..len {
        for k in (best + 1..=max_k).rev() {
            let suffix = &path[path.len() - k..];
            let fits = suffix
                .iter()
                .enumerate()
                .all(|(i, numeral)| *numeral == template.at(start + i));
            if fits && template.at(start + k) == candidate {
                best = k;
                break;
            }
        }
    }

    best
}

/// Score `candidate` (a base numeral) as a continuation of `path`.
pub fn match_patterns(path: &[&str], candidate: &str) -> PatternMatch {
    let mut result = PatternMatch::default();

    for template in PROGRESSIONS.iter().filter(|t| t.numerals.len() >= 2) {
        if path.is_empty() {
            if template.at(0) == candidate {
                result.raw += OPENING_SCORE;
                result.names.push(template.name.to_string());
            }
            continue;
        }

        let k = longest_run(path, candidate, template);
        if k > 0 {
            result.raw += k as f64;
            let confidence = (k as f64 / (template.numerals.len() - 1) as f64).min(1.0);
            result.confidence = result.confidence.max(confidence);
            result.names.push(template.name.to_string());
        }
    }

    result
}

fn root_motion_score(from: u8, to: u8) -> f64 {
    match (to + 12 - from) % 12 {
        // up a fourth is down a fifth
        5 => 0.4,
        7 | 1 | 2 | 10 | 11 => 0.25,
        3 | 4 | 8 | 9 => 0.2,
        6 => 0.05,
        _ => 0.0,
    }
}

/// Voice-leading strength of moving from `previous` to `candidate`, 0..1.
pub fn transition_strength(previous: Option<&ProgressionNode>, candidate: &ProgressionNode) -> f64 {
    let Some(previous) = previous else {
        return if candidate.function == HarmonicFunction::Tonic {
            0.5
        } else {
            0.25
        };
    };

    let from = &previous.chord;
    let to = &candidate.chord;
    let tones = to.notes.len().max(1) as f64;
    let common = from.common_tones(to) as f64 / tones;

    let target = to.root.index();
    let leading = from.pitch_classes().iter().any(|&pc| (pc + 1) % 12 == target);

    let mut strength = common * COMMON_TONE_WEIGHT + root_motion_score(from.root.index(), target);
    if leading {
        strength += LEADING_TONE_BONUS;
    }
    strength.min(1.0)
}

/// Pre-hybrid total on a 0..2 scale.
pub fn theory_total(pattern_normalized: f64, transition: f64, distance: f64) -> f64 {
    let closeness = 1.0 - (distance / CLOSENESS_HORIZON).min(1.0);
    pattern_normalized * PATTERN_WEIGHT + transition * TRANSITION_WEIGHT + closeness * CLOSENESS_WEIGHT
}

/// Breakdown fields that depend only on the node and the path.
pub(crate) fn base_breakdown(
    ctx: &TheoryContext<'_>,
    node: &ProgressionNode,
    source: CandidateSource,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::new(node.category, source);
    breakdown.transition_strength = transition_strength(ctx.previous(), node);
    breakdown.harmonic_distance = harmonic_distance(&node.chord, ctx.map.key, ctx.map.scale_type);
    breakdown.tension_level = node_tension(node, ctx.map.key, ctx.map.scale_type);
    breakdown
}

/// Score every node of the map.
pub fn score_theory_candidates(ctx: &TheoryContext<'_>) -> Vec<ScoredCandidate> {
    let numerals = ctx.path_numerals();

    let mut scored: Vec<ScoredCandidate> = ctx
        .map
        .nodes
        .iter()
        .map(|node| {
            let mut breakdown = base_breakdown(ctx, node, CandidateSource::Theory);
            let matched = match_patterns(&numerals, base_numeral(&node.roman_numeral));
            breakdown.pattern_raw = matched.raw;
            breakdown.pattern_confidence = matched.confidence;
            breakdown.matched_progressions = matched.names;
            ScoredCandidate {
                node: node.clone(),
                breakdown,
            }
        })
        .collect();

    let max_raw = scored
        .iter()
        .map(|c| c.breakdown.pattern_raw)
        .fold(0.0, f64::max);

    for candidate in &mut scored {
        let b = &mut candidate.breakdown;
        b.pattern_normalized = if max_raw > 0.0 { b.pattern_raw / max_raw } else { 0.0 };
        b.total = theory_total(b.pattern_normalized, b.transition_strength, b.harmonic_distance);
    }

    debug!(candidates = scored.len(), max_raw, "scored theory candidates");
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use music_theory::{build_progression_map, Note, ScaleType};

    fn c_major() -> ProgressionMap {
        build_progression_map(Note::C, ScaleType::Major)
    }

    fn path(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_path_rewards_openings() {
        let m = match_patterns(&[], "I");
        assert!(m.names.contains(&"Axis".to_string()));
        assert!(m.names.contains(&"Doo-wop".to_string()));
        assert_eq!(m.confidence, 0.0);
        assert!((m.raw - OPENING_SCORE * m.names.len() as f64).abs() < 1e-12);
    }

    #[test]
    fn ii_v_resolves_to_i() {
        let m = match_patterns(&["ii", "V"], "I");
        assert!(m.names.contains(&"Jazz ii-V-I".to_string()));
        // full template minus one
        assert_eq!(m.confidence, 1.0);
    }

    #[test]
    fn cyclic_templates_wrap() {
        // Axis: ... IV -> I wraps to the start
        let m = match_patterns(&["vi", "IV"], "I");
        assert!(m.names.contains(&"Axis".to_string()));
    }

    #[test]
    fn no_match_means_zero() {
        let m = match_patterns(&["iii"], "vii");
        assert_eq!(m, PatternMatch::default());
    }

    #[test]
    fn fifth_motion_with_leading_tone_is_strongest() {
        let map = c_major();
        let g = map.find("G").unwrap();
        let c = map.find("C").unwrap();
        let f = map.find("F").unwrap();

        let g_to_c = transition_strength(Some(g), c);
        // one common tone of three, down a fifth, B leads to C
        assert!((g_to_c - (0.5 / 3.0 + 0.4 + 0.1)).abs() < 1e-12);

        let g_to_f = transition_strength(Some(g), f);
        assert!(g_to_c > g_to_f);
        assert!(g_to_c <= 1.0);
    }

    #[test]
    fn empty_path_transition_favors_tonic() {
        let map = c_major();
        assert_eq!(transition_strength(None, map.find("C").unwrap()), 0.5);
        assert_eq!(transition_strength(None, map.find("G").unwrap()), 0.25);
    }

    #[test]
    fn theory_total_scale() {
        assert!((theory_total(1.0, 1.0, 0.0) - 2.0).abs() < 1e-12);
        assert_eq!(theory_total(0.0, 0.0, 3.0), 0.0);
        assert_eq!(theory_total(0.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn context_resolves_chords_outside_the_map() {
        let map = c_major();
        let ctx = TheoryContext::new(&map, &path(&["C", "E7", "Cadd9", "Am"]));
        let ids: Vec<&str> = ctx.path.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["C", "E7", "Am"]);
        assert_eq!(ctx.path_numerals(), ["I", "V", "vi"]);
    }

    #[test]
    fn theory_candidates_cover_the_whole_map() {
        let map = c_major();
        let ctx = TheoryContext::new(&map, &path(&["Dm", "G"]));
        let scored = score_theory_candidates(&ctx);
        assert_eq!(scored.len(), map.nodes.len());

        let c = scored.iter().find(|s| s.node.id == "C").unwrap();
        assert_eq!(c.breakdown.pattern_normalized, 1.0);
        assert!(c.breakdown.matched_progressions.contains(&"Jazz ii-V-I".to_string()));
        assert!(scored.iter().all(|s| (0.0..=2.0).contains(&s.breakdown.total)));
        assert!(scored.iter().all(|s| s.breakdown.source == CandidateSource::Theory));
    }

    #[test]
    fn baseline_tension_tracks_last_chord() {
        let map = c_major();
        assert_eq!(TheoryContext::new(&map, &[]).baseline_tension(), BASELINE_TENSION);
        let ctx = TheoryContext::new(&map, &path(&["G7"]));
        assert!(ctx.baseline_tension() > 0.7);
    }
}
