//! Weighted blend of theory and corpus scores.

use std::collections::HashMap;

use tracing::{debug, warn};

use music_theory::{canonical_symbol, symbols_match};

use crate::types::{
    ContextPattern, HybridWeights, ScoredCandidate, StatisticalRecommendation, TransitionCategory,
};

/// Scale of the pre-hybrid theory total.
pub const HARMONIC_SCALE: f64 = 2.0;
/// Upper bound on the pseudo-probability of a chord the corpus never saw.
pub const ESTIMATE_CAP: f64 = 0.01;
/// Friction bonus for chords without corpus data.
pub const NEUTRAL_FRICTION_BONUS: f64 = 0.5;

/// Corpus statistics merged across enharmonic spellings.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedStatistic {
    pub probability: f64,
    pub frequency: f64,
    pub friction: f64,
    pub category: Option<TransitionCategory>,
}

/// Merge recommendations under their canonical symbol: probabilities sum,
/// frequency takes the max and friction the min.
pub fn merge_recommendations(
    recommendations: &[StatisticalRecommendation],
) -> HashMap<String, MergedStatistic> {
    let mut merged: HashMap<String, MergedStatistic> = HashMap::new();

    for rec in recommendations {
        merged
            .entry(canonical_symbol(&rec.chord))
            .and_modify(|m| {
                m.probability += rec.probability;
                m.frequency = m.frequency.max(rec.frequency);
                m.friction = m.friction.min(rec.friction);
                m.category = m.category.or(rec.category);
            })
            .or_insert(MergedStatistic {
                probability: rec.probability,
                frequency: rec.frequency,
                friction: rec.friction,
                category: rec.category,
            });
    }

    merged
}

/// Sum the frequency of every pattern that extends `path` into the chord
/// that follows it. Keys are canonical symbols.
pub fn build_contextual_boost_map(path: &[String], patterns: &[ContextPattern]) -> HashMap<String, f64> {
    let mut boosts: HashMap<String, f64> = HashMap::new();

    for pattern in patterns {
        let Some(continuation) = pattern.chords.get(path.len()) else {
            continue;
        };
        let is_prefix = path
            .iter()
            .zip(&pattern.chords)
            .all(|(played, expected)| symbols_match(played, expected));
        if is_prefix {
            *boosts.entry(canonical_symbol(continuation)).or_insert(0.0) += pattern.frequency;
        }
    }

    boosts
}

/// Replace every candidate's theory total with the hybrid score and sort
/// descending. Candidates are never dropped.
pub fn combine_scores(
    mut candidates: Vec<ScoredCandidate>,
    recommendations: &[StatisticalRecommendation],
    contextual_boost: &HashMap<String, f64>,
    weights: &HybridWeights,
) -> Vec<ScoredCandidate> {
    if !weights.sums_to_one() {
        warn!(sum = weights.sum(), "hybrid weights do not sum to 1.0");
    }

    let stats = merge_recommendations(recommendations);

    let mut boosts: HashMap<String, f64> = HashMap::new();
    for (chord, boost) in contextual_boost {
        *boosts.entry(canonical_symbol(chord)).or_insert(0.0) += boost;
    }

    let keys: Vec<String> = candidates.iter().map(|c| canonical_symbol(&c.node.id)).collect();
    let max_boost = keys
        .iter()
        .filter_map(|k| boosts.get(k))
        .fold(0.0, |max: f64, &b| max.max(b));

    let mut matched = 0usize;
    for (candidate, key) in candidates.iter_mut().zip(&keys) {
        let b = &mut candidate.breakdown;
        let harmonic_norm = (b.total / HARMONIC_SCALE).clamp(0.0, 1.0);

        let (statistical, friction_bonus) = match stats.get(key) {
            Some(stat) => {
                matched += 1;
                b.statistical_probability = stat.probability;
                b.genre_frequency = Some(stat.frequency);
                b.friction_score = Some(stat.friction);
                b.category = b.category.or(stat.category);
                (stat.probability, 1.0 - stat.friction)
            }
            None => {
                let estimate = harmonic_norm * ESTIMATE_CAP;
                b.statistical_probability = estimate;
                b.genre_frequency = None;
                b.friction_score = None;
                (estimate, NEUTRAL_FRICTION_BONUS)
            }
        };

        let contextual = match boosts.get(key) {
            Some(boost) if max_boost > 0.0 => boost / max_boost,
            _ => 0.0,
        };
        b.contextual_score = contextual;

        b.total = statistical * weights.statistical
            + harmonic_norm * weights.harmonic
            + b.transition_strength * weights.voice_leading
            + friction_bonus * weights.friction
            + contextual * weights.contextual;
    }

    candidates.sort_by(|a, b| b.breakdown.total.total_cmp(&a.breakdown.total));

    debug!(candidates = candidates.len(), matched, max_boost, "combined hybrid scores");
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CandidateSource, ScoreBreakdown};
    use music_theory::{build_progression_map, Note, ScaleType};

    fn rec(chord: &str, probability: f64, frequency: f64, friction: f64) -> StatisticalRecommendation {
        StatisticalRecommendation {
            chord: chord.to_string(),
            probability,
            frequency,
            friction,
            category: None,
        }
    }

    fn pattern(chords: &[&str], frequency: f64) -> ContextPattern {
        ContextPattern {
            chords: chords.iter().map(|c| c.to_string()).collect(),
            frequency,
            count: 1,
        }
    }

    fn candidate(symbol: &str, total: f64, transition: f64) -> ScoredCandidate {
        let map = build_progression_map(Note::C, ScaleType::Major);
        let node = map.find(symbol).unwrap().clone();
        let mut breakdown = ScoreBreakdown::new(node.category, CandidateSource::Theory);
        breakdown.total = total;
        breakdown.transition_strength = transition;
        ScoredCandidate { node, breakdown }
    }

    #[test]
    fn enharmonic_recommendations_merge() {
        let merged = merge_recommendations(&[
            rec("A#", 0.1, 0.02, 0.4),
            rec("Bb", 0.2, 0.05, 0.2),
            rec("C", 0.3, 0.1, 0.1),
        ]);
        assert_eq!(merged.len(), 2);
        let bb = &merged["A#"];
        assert!((bb.probability - 0.3).abs() < 1e-12);
        assert_eq!(bb.frequency, 0.05);
        assert_eq!(bb.friction, 0.2);
    }

    #[test]
    fn empty_path_boosts_first_chords() {
        let boosts = build_contextual_boost_map(
            &[],
            &[
                pattern(&["C", "G"], 0.1),
                pattern(&["C", "F", "G"], 0.05),
                pattern(&["Am", "F"], 0.2),
            ],
        );
        assert_eq!(boosts.len(), 2);
        assert!((boosts["C"] - 0.15).abs() < 1e-12);
        assert_eq!(boosts["Am"], 0.2);
    }

    #[test]
    fn boosts_follow_the_prefix() {
        let path = vec!["C".to_string(), "G".to_string()];
        let boosts = build_contextual_boost_map(
            &path,
            &[
                pattern(&["C", "G", "Am"], 0.1),
                pattern(&["C", "G", "Am", "F"], 0.05),
                pattern(&["C", "G"], 0.3),
                pattern(&["C", "F", "G"], 0.3),
            ],
        );
        assert_eq!(boosts.len(), 1);
        assert!((boosts["Am"] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn boost_prefix_matching_is_enharmonic() {
        let path = vec!["Bb".to_string()];
        let boosts = build_contextual_boost_map(&path, &[pattern(&["A#", "F"], 0.1)]);
        assert_eq!(boosts["F"], 0.1);
    }

    #[test]
    fn hybrid_arithmetic() {
        let g = candidate("G", 1.0, 0.5);
        let f = candidate("F", 0.8, 0.3);
        let boosts = HashMap::from([("G".to_string(), 0.2), ("F".to_string(), 1.0)]);
        let out = combine_scores(
            vec![g, f],
            &[rec("G", 0.3, 0.12, 0.1)],
            &boosts,
            &HybridWeights::default(),
        );

        let g = out.iter().find(|c| c.node.id == "G").unwrap();
        let expected = 0.075 + 0.125 + 0.075 + 0.09 + 0.05;
        assert!((g.breakdown.total - expected).abs() < 1e-12, "{}", g.breakdown.total);
        assert_eq!(g.breakdown.contextual_score, 0.2);
        assert_eq!(g.breakdown.friction_score, Some(0.1));
        assert_eq!(g.breakdown.genre_frequency, Some(0.12));

        let f = out.iter().find(|c| c.node.id == "F").unwrap();
        let estimate = 0.4 * ESTIMATE_CAP;
        assert_eq!(f.breakdown.statistical_probability, estimate);
        assert_eq!(f.breakdown.friction_score, None);
        let expected_f = estimate * 0.25 + 0.4 * 0.25 + 0.3 * 0.15 + 0.5 * 0.1 + 1.0 * 0.25;
        assert!((f.breakdown.total - expected_f).abs() < 1e-12);
    }

    #[test]
    fn output_keeps_every_candidate_sorted() {
        let candidates = vec![
            candidate("C", 0.2, 0.1),
            candidate("Dm", 1.8, 0.9),
            candidate("Bb", 0.5, 0.2),
            candidate("Am", 1.1, 0.5),
        ];
        let out = combine_scores(candidates, &[], &HashMap::new(), &HybridWeights::default());
        assert_eq!(out.len(), 4);
        assert!(out.windows(2).all(|w| w[0].breakdown.total >= w[1].breakdown.total));
        assert_eq!(out[0].node.id, "Dm");
        assert!(out.iter().all(|c| c.breakdown.contextual_score == 0.0));
        assert_eq!(out[3].node.id, "C");
    }

    #[test]
    fn recommendation_spelling_does_not_matter() {
        let out = combine_scores(
            vec![candidate("Bb", 1.0, 0.5)],
            &[rec("Bb", 0.2, 0.05, 0.3)],
            &HashMap::new(),
            &HybridWeights::default(),
        );
        assert_eq!(out[0].breakdown.statistical_probability, 0.2);
    }
}
