//! Candidates observed in the corpus but absent from the key's map.

use std::collections::HashMap;

use tracing::debug;

use music_theory::{canonical_symbol, parse_chord_symbol, ProgressionNode, SymbolParse};

use crate::theory_score::{base_breakdown, TheoryContext};
use crate::types::{CandidateSource, ScoredCandidate, StatisticalRecommendation};

/// Synthesize a node for every recommendation the map doesn't already
/// cover.
///
/// Enharmonic spellings collapse to one candidate: the spelling with the
/// highest probability, first seen on ties. Unparseable chords are
/// dropped. The breakdown is seeded from the statistics with pattern
/// fields zeroed; `total` starts at the observed probability.
pub fn synthesize_candidates(
    ctx: &TheoryContext<'_>,
    recommendations: &[StatisticalRecommendation],
) -> Vec<ScoredCandidate> {
    let mut order: Vec<String> = Vec::new();
    let mut best: HashMap<String, &StatisticalRecommendation> = HashMap::new();

    for rec in recommendations {
        if ctx.map.contains(&rec.chord) {
            continue;
        }
        let key = canonical_symbol(&rec.chord);
        match best.get(&key) {
            Some(current) if current.probability >= rec.probability => {}
            Some(_) => {
                best.insert(key, rec);
            }
            None => {
                order.push(key.clone());
                best.insert(key, rec);
            }
        }
    }

    let mut dropped = 0usize;
    let candidates: Vec<ScoredCandidate> = order
        .iter()
        .filter_map(|key| best.get(key).copied())
        .filter_map(|rec| match parse_chord_symbol(&rec.chord) {
            SymbolParse::Parsed(parsed) => {
                let node = ProgressionNode::infer(
                    parsed.to_chord().symbol(),
                    parsed.to_chord(),
                    ctx.map.key,
                    ctx.map.scale_type,
                );
                let mut breakdown = base_breakdown(ctx, &node, CandidateSource::Statistical);
                breakdown.statistical_probability = rec.probability;
                breakdown.genre_frequency = Some(rec.frequency);
                breakdown.friction_score = Some(rec.friction);
                breakdown.category = rec.category;
                breakdown.total = rec.probability;
                Some(ScoredCandidate { node, breakdown })
            }
            SymbolParse::Unrecognized(symbol) => {
                debug!(%symbol, "dropping unparseable statistical chord");
                dropped += 1;
                None
            }
        })
        .collect();

    debug!(synthesized = candidates.len(), dropped, "synthesized statistical candidates");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use music_theory::{build_progression_map, ColorClass, HarmonicFunction, Note, ScaleType};

    fn rec(chord: &str, probability: f64) -> StatisticalRecommendation {
        StatisticalRecommendation {
            chord: chord.to_string(),
            probability,
            frequency: 0.02,
            friction: 0.8,
            category: None,
        }
    }

    #[test]
    fn map_chords_are_not_duplicated() {
        let map = build_progression_map(Note::C, ScaleType::Major);
        let ctx = TheoryContext::new(&map, &["C".to_string()]);
        let out = synthesize_candidates(&ctx, &[rec("G", 0.4), rec("Bb", 0.1), rec("Ab", 0.1)]);
        assert!(out.is_empty());
    }

    #[test]
    fn outside_chords_are_classified() {
        let map = build_progression_map(Note::C, ScaleType::Major);
        let ctx = TheoryContext::new(&map, &["C".to_string()]);
        let out = synthesize_candidates(&ctx, &[rec("F#7", 0.05), rec("Ebm", 0.02)]);
        assert_eq!(out.len(), 2);

        let fs7 = &out[0];
        assert_eq!(fs7.node.id, "F#7");
        assert_eq!(fs7.node.function, HarmonicFunction::Dominant);
        assert_eq!(fs7.node.category, ColorClass::SecondaryDominant);
        assert_eq!(fs7.breakdown.source, CandidateSource::Statistical);
        assert_eq!(fs7.breakdown.pattern_raw, 0.0);
        assert_eq!(fs7.breakdown.total, 0.05);
        assert_eq!(fs7.breakdown.friction_score, Some(0.8));
        assert!(fs7.breakdown.harmonic_distance > 0.0);

        assert_eq!(out[1].node.category, ColorClass::Borrowed);
    }

    #[test]
    fn unparseable_chords_are_dropped() {
        let map = build_progression_map(Note::C, ScaleType::Major);
        let ctx = TheoryContext::new(&map, &[]);
        let out = synthesize_candidates(&ctx, &[rec("C9", 0.2), rec("G/B", 0.2), rec("Ebm", 0.1)]);
        let ids: Vec<&str> = out.iter().map(|c| c.node.id.as_str()).collect();
        assert_eq!(ids, ["Ebm"]);
    }

    #[test]
    fn enharmonic_spellings_collapse_to_the_likelier() {
        let map = build_progression_map(Note::C, ScaleType::Major);
        let ctx = TheoryContext::new(&map, &[]);
        let out = synthesize_candidates(&ctx, &[rec("D#m", 0.01), rec("Ebm", 0.03), rec("D#m", 0.02)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].node.id, "Ebm");
        assert_eq!(out[0].breakdown.statistical_probability, 0.03);
    }
}
