//! Next-chord recommendation.
//!
//! Theory candidates come from the key's progression map and are scored on
//! pattern fit, voice leading and closeness to the key. Corpus statistics
//! add chords the map lacks, then both are blended by [`combine_scores`]
//! and grouped by goal and by genre rarity.

pub mod candidates;
pub mod categorize;
pub mod engine;
pub mod hybrid;
pub mod patterns;
pub mod theory_score;
pub mod types;

pub use candidates::synthesize_candidates;
pub use categorize::{
    categorize_by_genre, categorize_recommendations, get_rarity_label, goal_tags, FrequencyStats,
    GenreBuckets, GoalBucket, GoalBuckets, RarityLabel,
};
pub use engine::{
    EngineSettings, NoStatistics, ProgressionEngine, RecommendationRequest, Recommendations,
    StatisticsSource,
};
pub use hybrid::{build_contextual_boost_map, combine_scores, merge_recommendations};
pub use theory_score::{score_theory_candidates, transition_strength, TheoryContext};
pub use types::{
    CandidateSource, ContextPattern, HybridWeights, ScoreBreakdown, ScoredCandidate,
    StatisticalRecommendation, TransitionCategory,
};
