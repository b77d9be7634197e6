//! End-to-end runs of the recommendation pipeline over fixed statistics.

use std::collections::HashMap;
use std::sync::Arc;

use music_theory::{build_progression_map, Note, ScaleType};
use pretty_assertions::assert_eq;
use progression_engine::{
    combine_scores, CandidateSource, ContextPattern, HybridWeights, NoStatistics, ProgressionEngine,
    RecommendationRequest, ScoreBreakdown, ScoredCandidate, StatisticalRecommendation,
    StatisticsSource,
};

struct FixedStatistics {
    recommendations: Vec<StatisticalRecommendation>,
    patterns: Vec<ContextPattern>,
}

impl StatisticsSource for FixedStatistics {
    fn recommendations(&self, _path: &[String], _genre: &str, limit: usize) -> Vec<StatisticalRecommendation> {
        self.recommendations.iter().take(limit).cloned().collect()
    }

    fn matching_patterns(&self, _path: &[String], _genre: &str) -> Vec<ContextPattern> {
        self.patterns.clone()
    }
}

fn rec(chord: &str, probability: f64, frequency: f64, friction: f64) -> StatisticalRecommendation {
    StatisticalRecommendation {
        chord: chord.to_string(),
        probability,
        frequency,
        friction,
        category: None,
    }
}

fn request(path: &[&str]) -> RecommendationRequest {
    RecommendationRequest {
        key: Note::C,
        scale_type: ScaleType::Major,
        genre: "pop".to_string(),
        path: path.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn test_g_in_c_major_scores_exactly() {
    let map = build_progression_map(Note::C, ScaleType::Major);
    let node = map.find("G").unwrap().clone();
    let mut breakdown = ScoreBreakdown::new(node.category, CandidateSource::Theory);
    breakdown.total = 1.0;
    breakdown.transition_strength = 0.5;
    let g = ScoredCandidate { node, breakdown };

    let other = map.find("F").unwrap().clone();
    let f = ScoredCandidate {
        breakdown: ScoreBreakdown::new(other.category, CandidateSource::Theory),
        node: other,
    };

    let boosts = HashMap::from([("G".to_string(), 0.2), ("F".to_string(), 1.0)]);
    let out = combine_scores(
        vec![g, f],
        &[rec("G", 0.3, 0.1, 0.1)],
        &boosts,
        &HybridWeights::default(),
    );

    let g = out.iter().find(|c| c.node.id == "G").unwrap();
    assert!((g.breakdown.total - 0.415).abs() < 1e-12, "total = {}", g.breakdown.total);
}

#[test]
fn test_no_candidates_dropped_and_sorted() {
    let source = FixedStatistics {
        recommendations: vec![
            rec("G", 0.4, 0.15, 0.0),
            rec("F#7", 0.05, 0.01, 0.9),
            rec("Cadd9", 0.05, 0.01, 0.9),
        ],
        patterns: vec![],
    };
    let engine = ProgressionEngine::new(Arc::new(source));
    let map = build_progression_map(Note::C, ScaleType::Major);

    let result = engine.recommend(&request(&["C"]));
    // every map node plus the one parseable outside chord
    assert_eq!(result.ranked.len(), map.nodes.len() + 1);
    assert!(result
        .ranked
        .windows(2)
        .all(|w| w[0].breakdown.total >= w[1].breakdown.total));
    assert!(result
        .ranked
        .iter()
        .any(|c| c.node.id == "F#7" && c.breakdown.source == CandidateSource::Statistical));
    assert_eq!(result.ranked[0].node.id, "G");
}

#[test]
fn test_patterns_steer_the_ranking() {
    let source = FixedStatistics {
        recommendations: vec![],
        patterns: vec![ContextPattern {
            chords: vec!["C".into(), "G".into(), "Am".into(), "F".into()],
            frequency: 0.3,
            count: 30,
        }],
    };
    let engine = ProgressionEngine::new(Arc::new(source));
    let result = engine.recommend(&request(&["C", "G"]));

    let am = result.ranked.iter().find(|c| c.node.id == "Am").unwrap();
    assert_eq!(am.breakdown.contextual_score, 1.0);
    assert!(am.breakdown.matched_progressions.contains(&"Axis".to_string()));
    assert_eq!(result.ranked[0].node.id, "Am");
}

#[test]
fn test_buckets_respect_limits() {
    let engine = ProgressionEngine::new(Arc::new(NoStatistics));
    let result = engine.recommend(&request(&["Dm", "G7"]));

    for list in [
        &result.by_goal.safe_common,
        &result.by_goal.tension_building,
        &result.by_goal.exploratory,
        &result.by_goal.resolution,
    ] {
        assert!(list.len() <= 8);
    }
    assert!(result.by_goal.resolution.iter().any(|c| c.node.roman_numeral == "I"));
    assert!(result.by_genre.canonical.len() <= 20);
    assert!(result.by_genre.spicy.len() <= 20);
    assert!(result.by_genre.stats.is_none());
}

#[test]
fn test_without_statistics_theory_decides() {
    let engine = ProgressionEngine::new(Arc::new(NoStatistics));
    let result = engine.recommend(&request(&["Dm", "G"]));
    let top: Vec<&str> = result.ranked.iter().take(2).map(|c| c.node.id.as_str()).collect();
    assert!(top.contains(&"C") || top.contains(&"Cmaj7"), "top = {top:?}");
    assert!(result.ranked.iter().all(|c| c.breakdown.friction_score.is_none()));
}
