//! Course equivalency matching in single, set and plan mode.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::course::{CatalogCourse, InputCourseDescriptor};
use crate::domain::result::{
    Decision, DecisionThresholds, MatchResult, PlanItemResult, PlanMatchResult,
};
use crate::processing::embedding::{CatalogEmbeddingCache, EmbeddingError, EmbeddingProvider};
use crate::processing::normalizer::TextNormalizer;
use crate::processing::ranker::{RankError, best_match};

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("plan contains no courses")]
    EmptyPlan,
    #[error("embedding capability unavailable: {0}")]
    EmbeddingUnavailable(#[from] EmbeddingError),
}

/// What to compare against a catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ComparisonMode {
    /// One course description.
    Single { description: String },
    /// Several descriptions that together make up one course.
    Set { descriptions: Vec<String> },
    /// Independent courses of a curriculum, in order.
    Plan { items: Vec<InputCourseDescriptor> },
}

impl ComparisonMode {
    pub fn name(&self) -> &'static str {
        match self {
            ComparisonMode::Single { .. } => "single",
            ComparisonMode::Set { .. } => "set",
            ComparisonMode::Plan { .. } => "plan",
        }
    }
}

/// Result of a [`ComparisonMode`], one variant per mode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ComparisonOutcome {
    Single(MatchResult),
    Set(MatchResult),
    Plan(PlanMatchResult),
}

impl ComparisonOutcome {
    pub fn score(&self) -> f64 {
        match self {
            ComparisonOutcome::Single(result) | ComparisonOutcome::Set(result) => result.score,
            ComparisonOutcome::Plan(plan) => plan.aggregate_score,
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            ComparisonOutcome::Single(result) | ComparisonOutcome::Set(result) => result.decision,
            ComparisonOutcome::Plan(plan) => plan.decision,
        }
    }
}

/// Finds the closest catalog course for externally supplied descriptions.
///
/// Candidates must already be scoped to one institution. The matcher keeps
/// no per-request state; the optional catalog cache only memoizes vectors.
pub struct EquivalencyMatcher {
    normalizer: TextNormalizer,
    embedder: Arc<dyn EmbeddingProvider>,
    thresholds: DecisionThresholds,
    catalog_cache: Option<CatalogEmbeddingCache>,
}

impl EquivalencyMatcher {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            normalizer: TextNormalizer::default(),
            embedder,
            thresholds: DecisionThresholds::default(),
            catalog_cache: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Reuse catalog embeddings across requests while descriptions are
    /// unchanged.
    pub fn with_catalog_cache(mut self) -> Self {
        self.catalog_cache = Some(CatalogEmbeddingCache::new());
        self
    }

    pub fn thresholds(&self) -> DecisionThresholds {
        self.thresholds
    }

    /// Match one description against the catalog.
    pub fn match_single(
        &self,
        description: &str,
        candidates: &[CatalogCourse],
    ) -> Result<MatchResult, MatchError> {
        if candidates.is_empty() {
            return Ok(MatchResult::no_candidates());
        }

        let query = self.embedder.embed(&self.normalizer.normalize(description))?;
        let catalog = self.embed_catalog(candidates)?;
        self.rank(&query, candidates, &catalog)
    }

    /// Match several descriptions as one unit.
    ///
    /// Each description is normalized on its own, the results are joined with
    /// spaces in input order and the joined document is embedded once. Item
    /// vectors are never averaged.
    pub fn match_set<S>(
        &self,
        descriptions: &[S],
        candidates: &[CatalogCourse],
    ) -> Result<MatchResult, MatchError>
    where
        S: AsRef<str>,
    {
        if candidates.is_empty() {
            return Ok(MatchResult::no_candidates());
        }

        let combined = descriptions
            .iter()
            .map(|description| self.normalizer.normalize(description.as_ref()))
            .collect::<Vec<_>>()
            .join(" ");

        let query = self.embedder.embed(&combined)?;
        let catalog = self.embed_catalog(candidates)?;
        self.rank(&query, candidates, &catalog)
    }

    /// Match every plan item independently against the same catalog.
    ///
    /// The catalog is embedded once for the whole plan. Results keep the
    /// input order and the aggregate is the unweighted mean of item scores.
    pub fn match_plan(
        &self,
        plan_items: &[InputCourseDescriptor],
        candidates: &[CatalogCourse],
    ) -> Result<PlanMatchResult, MatchError> {
        if plan_items.is_empty() {
            return Err(MatchError::EmptyPlan);
        }

        let results = if candidates.is_empty() {
            vec![MatchResult::no_candidates(); plan_items.len()]
        } else {
            let catalog = self.embed_catalog(candidates)?;
            let queries: Vec<String> = plan_items
                .iter()
                .map(|item| self.normalizer.normalize(&item.description))
                .collect();
            let query_vectors = self.embed_all(&queries)?;

            query_vectors
                .iter()
                .map(|query| self.rank(query, candidates, &catalog))
                .collect::<Result<Vec<_>, _>>()?
        };

        let aggregate_score =
            results.iter().map(|result| result.score).sum::<f64>() / results.len() as f64;

        let items = plan_items
            .iter()
            .cloned()
            .zip(results)
            .map(|(input, result)| PlanItemResult { input, result })
            .collect();

        Ok(PlanMatchResult {
            items,
            aggregate_score,
            decision: self.thresholds.classify(aggregate_score),
        })
    }

    /// Dispatch a comparison to the mode-specific operation.
    pub fn compare(
        &self,
        mode: &ComparisonMode,
        candidates: &[CatalogCourse],
    ) -> Result<ComparisonOutcome, MatchError> {
        match mode {
            ComparisonMode::Single { description } => self
                .match_single(description, candidates)
                .map(ComparisonOutcome::Single),
            ComparisonMode::Set { descriptions } => self
                .match_set(descriptions, candidates)
                .map(ComparisonOutcome::Set),
            ComparisonMode::Plan { items } => self
                .match_plan(items, candidates)
                .map(ComparisonOutcome::Plan),
        }
    }

    fn embed_catalog(&self, candidates: &[CatalogCourse]) -> Result<Vec<Vec<f32>>, MatchError> {
        log::debug!("Embedding catalog of {} courses", candidates.len());

        let vectors = match &self.catalog_cache {
            Some(cache) => cache.resolve(candidates, self.embedder.as_ref(), |course| {
                self.normalizer.normalize(&course.description)
            })?,
            None => {
                let texts: Vec<String> = candidates
                    .iter()
                    .map(|course| self.normalizer.normalize(&course.description))
                    .collect();
                self.embed_all(&texts)?
            }
        };

        Ok(vectors)
    }

    fn embed_all(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MatchError> {
        let vectors = self.embedder.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            return Err(EmbeddingError::BatchSize {
                expected: texts.len(),
                found: vectors.len(),
            }
            .into());
        }
        Ok(vectors)
    }

    fn rank(
        &self,
        query: &[f32],
        candidates: &[CatalogCourse],
        catalog: &[Vec<f32>],
    ) -> Result<MatchResult, MatchError> {
        let (index, similarity) = match best_match(query, catalog) {
            Ok(best) => best,
            Err(RankError::EmptyCandidateSet) => return Ok(MatchResult::no_candidates()),
            Err(RankError::DimensionMismatch {
                expected, found, ..
            }) => return Err(EmbeddingError::DimensionMismatch { expected, found }.into()),
        };

        let score = similarity * 100.0;
        Ok(MatchResult {
            matched: candidates.get(index).cloned(),
            score,
            decision: self.thresholds.classify(score),
        })
    }
}
