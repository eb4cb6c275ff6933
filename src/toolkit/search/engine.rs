use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use super::models::{CdsName, ConceptScore, SearchRequest, SearchResponse, SearchResult};
use super::scoring::QueryScorer;
use crate::core::config::{
    DEFAULT_QUERY_CONCEPT_THRESHOLD, DEFAULT_SEARCH_RESULT_THRESHOLD, OntoRankConfig,
    check_unit_interval,
};
use crate::core::error::{OntoRankError, Result};
use crate::core::identity::GraphKind;
use crate::db::{DatasetInfo, ResolvedConfiguration};
use crate::toolkit::matrix::{Matrix, cosine_similarity};
use crate::toolkit::ontology::Taxonomy;
use crate::utils::uri_fragment;

/// Concepts reported for the query and for each result.
pub const TOP_CONCEPTS: usize = 5;


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub query_concept: f64,
    pub search_result: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            query_concept: DEFAULT_QUERY_CONCEPT_THRESHOLD,
            search_result: DEFAULT_SEARCH_RESULT_THRESHOLD,
        }
    }
}

impl From<&OntoRankConfig> for Thresholds {
    fn from(config: &OntoRankConfig) -> Self {
        Self {
            query_concept: config.query_concept_threshold,
            search_result: config.search_result_threshold,
        }
    }
}


/// Everything a ranking engine is assembled from.
#[derive(Clone)]
pub struct EngineParts {
    pub configuration: ResolvedConfiguration,
    pub taxonomy: Arc<Taxonomy>,
    pub ccs: Arc<Matrix>,
    pub similarity: Arc<Matrix>,
    pub autotag: Arc<Matrix>,
    pub scorer: QueryScorer,
    pub datasets: Arc<HashMap<String, DatasetInfo>>,
    pub thresholds: Thresholds,
}


/// Immutable search snapshot for one configuration.
pub struct RankingEngine {
    parts: EngineParts,
    all: Arc<Matrix>,
}

impl fmt::Debug for RankingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RankingEngine")
            .field("configuration", &self.parts.configuration.id)
            .field("concepts", &self.parts.ccs.column_count())
            .field("similarity_rows", &self.parts.similarity.row_count())
            .field("autotag_rows", &self.parts.autotag.row_count())
            .field("thresholds", &self.parts.thresholds)
            .finish()
    }
}

impl RankingEngine {
    pub fn new(parts: EngineParts) -> Result<Self> {
        let index = parts.ccs.columns();
        for (name, cds) in [("similarity", &parts.similarity), ("autotag", &parts.autotag)] {
            if cds.columns() != index {
                return Err(OntoRankError::Internal(format!(
                    "{name} matrix of {} is not over the concept matrix's concepts",
                    parts.configuration.id
                )));
            }
        }
        let all = Arc::new(parts.similarity.concat(&parts.autotag)?);

        info!(
            "Ranking engine for {}: {} concepts, {} + {} dataset rows",
            parts.configuration.id,
            index.len(),
            parts.similarity.row_count(),
            parts.autotag.row_count()
        );
        Ok(Self { parts, all })
    }

    /// Same engine with one concept-dataset matrix replaced.
    pub fn with_cds(&self, kind: GraphKind, cds: Arc<Matrix>) -> Result<Self> {
        let mut parts = self.parts.clone();
        match kind {
            GraphKind::Similarity => parts.similarity = cds,
            GraphKind::Autotag => parts.autotag = cds,
            other => {
                return Err(OntoRankError::Internal(format!(
                    "{other} is not a concept-dataset matrix"
                )));
            }
        }
        Self::new(parts)
    }

    pub fn configuration(&self) -> &ResolvedConfiguration {
        &self.parts.configuration
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.parts.taxonomy
    }

    pub fn ccs(&self) -> &Arc<Matrix> {
        &self.parts.ccs
    }

    pub fn thresholds(&self) -> Thresholds {
        self.parts.thresholds
    }

    pub fn cds(&self, name: CdsName) -> &Arc<Matrix> {
        match name {
            CdsName::Similarity => &self.parts.similarity,
            CdsName::Autotag => &self.parts.autotag,
            CdsName::All => &self.all,
        }
    }

    pub fn query_vector(&self, query: &str, threshold: f64) -> Result<Vec<f64>> {
        self.parts.scorer.score(query, &self.parts.ccs, threshold)
    }

    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let query_threshold = request
            .query_concept_threshold
            .unwrap_or(self.parts.thresholds.query_concept);
        let result_threshold = request
            .search_result_threshold
            .unwrap_or(self.parts.thresholds.search_result);
        check_unit_interval("search result threshold", result_threshold)?;

        let query = self.query_vector(&request.query, query_threshold)?;
        let cds = self.cds(request.cds);

        let mut ranked: Vec<(usize, f64)> = cds
            .iter_rows()
            .enumerate()
            .map(|(i, (_, row))| (i, cosine_similarity(&query, row)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let mut seen = HashSet::new();
        let results: Vec<SearchResult> = ranked
            .into_iter()
            .filter(|&(i, _)| seen.insert(cds.rows()[i].as_str()))
            .filter(|&(_, score)| score >= result_threshold)
            .map(|(i, score)| {
                let dataset = cds.rows()[i].clone();
                SearchResult {
                    info: request
                        .include_dataset_info
                        .then(|| self.dataset_info(&dataset)),
                    concepts: request
                        .include_concepts
                        .then(|| self.top_concepts(cds.row(i))),
                    dataset,
                    score,
                }
            })
            .collect();

        debug!(
            "Query {:?} against {} matched {} datasets",
            request.query,
            request.cds,
            results.len()
        );
        Ok(SearchResponse {
            results,
            query_concepts: self.top_concepts(&query),
        })
    }

    /// Whether the catalog loaded with this engine describes `dataset`.
    pub fn has_dataset(&self, dataset: &str) -> bool {
        self.parts.datasets.contains_key(dataset)
    }

    pub fn dataset_info(&self, dataset: &str) -> DatasetInfo {
        self.parts
            .datasets
            .get(dataset)
            .cloned()
            .unwrap_or_else(|| DatasetInfo::bare(dataset))
    }

    /// Highest scoring concepts of a row aligned with the concept index.
    pub fn top_concepts(&self, row: &[f64]) -> Vec<ConceptScore> {
        let index = self.parts.ccs.columns();
        let mut order: Vec<usize> = (0..row.len()).collect();
        order.sort_by(|&a, &b| row[b].partial_cmp(&row[a]).unwrap_or(Ordering::Equal));

        order
            .into_iter()
            .take(TOP_CONCEPTS)
            .filter_map(|i| {
                let uri = index.concept(i)?;
                Some(ConceptScore {
                    uri: uri.to_string(),
                    label: self.concept_label(uri),
                    score: row[i],
                })
            })
            .collect()
    }

    fn concept_label(&self, uri: &str) -> String {
        let language = self.parts.scorer.language().code();
        self.parts
            .taxonomy
            .concept(uri)
            .and_then(|c| c.labels(language).next())
            .map(str::to_string)
            .unwrap_or_else(|| uri_fragment(uri))
    }
}
