use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use music_theory::{build_progression_map, Note, ProgressionMap, ScaleType};

use crate::candidates::synthesize_candidates;
use crate::categorize::{
    categorize_by_genre, categorize_recommendations, GenreBuckets, GoalBuckets,
    DEFAULT_GENRE_BUCKET_SIZE, DEFAULT_GOAL_BUCKET_SIZE,
};
use crate::hybrid::{build_contextual_boost_map, combine_scores};
use crate::theory_score::{score_theory_candidates, TheoryContext};
use crate::types::{ContextPattern, HybridWeights, ScoredCandidate, StatisticalRecommendation};

/// Source of corpus statistics for a genre.
///
/// Implemented by the on-disk corpus; tests use fixed tables.
pub trait StatisticsSource: Send + Sync {
    /// Likely next chords after `path`, most probable first.
    fn recommendations(&self, path: &[String], genre: &str, limit: usize) -> Vec<StatisticalRecommendation>;

    /// Mined patterns that start with `path`.
    fn matching_patterns(&self, path: &[String], genre: &str) -> Vec<ContextPattern>;
}

/// A source with no data. Every candidate falls back to its theory score.
pub struct NoStatistics;

impl StatisticsSource for NoStatistics {
    fn recommendations(&self, _path: &[String], _genre: &str, _limit: usize) -> Vec<StatisticalRecommendation> {
        Vec::new()
    }

    fn matching_patterns(&self, _path: &[String], _genre: &str) -> Vec<ContextPattern> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub weights: HybridWeights,
    pub goal_bucket_size: usize,
    pub genre_bucket_size: usize,
    /// How many corpus recommendations to request per query.
    pub max_statistical: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            weights: HybridWeights::default(),
            goal_bucket_size: DEFAULT_GOAL_BUCKET_SIZE,
            genre_bucket_size: DEFAULT_GENRE_BUCKET_SIZE,
            max_statistical: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub key: Note,
    pub scale_type: ScaleType,
    pub genre: String,
    /// Chords played so far.
    pub path: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub key: Note,
    pub scale_type: ScaleType,
    pub genre: String,
    pub ranked: Vec<ScoredCandidate>,
    pub by_goal: GoalBuckets,
    pub by_genre: GenreBuckets,
}

/// Chord recommendation pipeline over a statistics source.
pub struct ProgressionEngine {
    source: Arc<dyn StatisticsSource>,
    settings: EngineSettings,
}

impl ProgressionEngine {
    pub fn new(source: Arc<dyn StatisticsSource>) -> Self {
        Self::with_settings(source, EngineSettings::default())
    }

    pub fn with_settings(source: Arc<dyn StatisticsSource>, settings: EngineSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn recommend(&self, request: &RecommendationRequest) -> Recommendations {
        let map = build_progression_map(request.key, request.scale_type);
        self.recommend_with_map(&map, request)
    }

    /// Run the pipeline against a prebuilt map for `request.key`.
    pub fn recommend_with_map(&self, map: &ProgressionMap, request: &RecommendationRequest) -> Recommendations {
        let ctx = TheoryContext::new(map, &request.path);

        // 1. Fetch corpus data once for this query
        let stats = self
            .source
            .recommendations(&request.path, &request.genre, self.settings.max_statistical);
        let patterns = self.source.matching_patterns(&request.path, &request.genre);

        // 2. Theory candidates, then corpus chords the map lacks
        let mut candidates = score_theory_candidates(&ctx);
        candidates.extend(synthesize_candidates(&ctx, &stats));

        // 3. Blend
        let boosts = build_contextual_boost_map(&request.path, &patterns);
        let ranked = combine_scores(candidates, &stats, &boosts, &self.settings.weights);

        // 4. Categorize
        let by_goal = categorize_recommendations(&ranked, ctx.baseline_tension(), self.settings.goal_bucket_size);
        let by_genre = categorize_by_genre(&ranked, self.settings.genre_bucket_size);

        debug!(
            statistical = stats.len(),
            patterns = patterns.len(),
            ranked = ranked.len(),
            "pipeline stages complete"
        );
        info!(
            key = %request.key,
            scale = %request.scale_type,
            genre = %request.genre,
            path_len = request.path.len(),
            top = ranked.first().map(|c| c.node.id.as_str()).unwrap_or("-"),
            "recommended next chords"
        );

        Recommendations {
            key: request.key,
            scale_type: request.scale_type,
            genre: request.genre.clone(),
            ranked,
            by_goal,
            by_genre,
        }
    }
}
