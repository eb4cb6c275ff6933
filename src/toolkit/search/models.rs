use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::core::identity::GraphKind;
use crate::db::DatasetInfo;


/// Which concept-dataset matrix a search runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CdsName {
    Similarity,
    Autotag,
    #[default]
    All,
}

impl CdsName {
    /// Tagging kind behind a single-source matrix.
    pub fn kind(self) -> Option<GraphKind> {
        match self {
            Self::Similarity => Some(GraphKind::Similarity),
            Self::Autotag => Some(GraphKind::Autotag),
            Self::All => None,
        }
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub cds: CdsName,
    /// Overrides the engine's query-concept threshold.
    #[serde(default)]
    pub query_concept_threshold: Option<f64>,
    /// Overrides the engine's search-result threshold.
    #[serde(default)]
    pub search_result_threshold: Option<f64>,
    #[serde(default = "default_true")]
    pub include_dataset_info: bool,
    #[serde(default = "default_true")]
    pub include_concepts: bool,
}

fn default_true() -> bool {
    true
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            cds: CdsName::All,
            query_concept_threshold: None,
            search_result_threshold: None,
            include_dataset_info: true,
            include_concepts: true,
        }
    }

    #[must_use]
    pub fn with_cds(mut self, cds: CdsName) -> Self {
        self.cds = cds;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, query_concept: Option<f64>, search_result: Option<f64>) -> Self {
        self.query_concept_threshold = query_concept;
        self.search_result_threshold = search_result;
        self
    }

    #[must_use]
    pub fn without_dataset_info(mut self) -> Self {
        self.include_dataset_info = false;
        self
    }

    #[must_use]
    pub fn without_concepts(mut self) -> Self {
        self.include_concepts = false;
        self
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptScore {
    pub uri: String,
    pub label: String,
    pub score: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub dataset: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<DatasetInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<Vec<ConceptScore>>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    /// Concepts the query itself is closest to.
    pub query_concepts: Vec<ConceptScore>,
}
