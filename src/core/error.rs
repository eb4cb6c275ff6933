

use std::fmt;

use thiserror::Error;

use crate::core::identity::GraphKind;


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectedPair {
    pub first: String,
    pub second: String,
}

impl fmt::Display for DisconnectedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> / <{}>", self.first, self.second)
    }
}


fn describe_pairs(pairs: &[DisconnectedPair]) -> String {
    const SHOWN: usize = 5;
    let mut out = pairs
        .iter()
        .take(SHOWN)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if pairs.len() > SHOWN {
        out.push_str(&format!(" and {} more", pairs.len() - SHOWN));
    }
    out
}


#[derive(Error, Debug)]
pub enum OntoRankError {
    #[error(
        "Inconsistent configuration {configuration}: {field} graph is {expected} \
         according to one source but {found} according to another"
    )]
    InconsistentConfiguration {
        configuration: String,
        field: &'static str,
        expected: String,
        found: String,
    },

    #[error(
        "No up-to-date {kind} matrix for graph {version} (parameters: [{}]) and auto-compute is disabled",
        .parameters.join(", ")
    )]
    MissingMatrix {
        kind: GraphKind,
        version: String,
        parameters: Vec<String>,
    },

    #[error("Taxonomy is disconnected, no common subsumer for {} pair(s): {}", .pairs.len(), describe_pairs(.pairs))]
    DisconnectedTaxonomy { pairs: Vec<DisconnectedPair> },

    #[error("No {kind} found with identifier \"{id}\"")]
    UnrecognizedIdentifier { kind: &'static str, id: String },

    #[error("Concept <{concept}> referenced by {context} is not part of the taxonomy")]
    UnknownConcept { concept: String, context: String },

    #[error("Unknown concept-dataset matrix: {0}")]
    UnknownCds(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OntoRankError {
    pub fn is_missing_matrix(&self) -> bool {
        matches!(self, Self::MissingMatrix { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnrecognizedIdentifier { .. })
    }
}

impl From<config::ConfigError> for OntoRankError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<tokio::task::JoinError> for OntoRankError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {err}"))
    }
}


pub type Result<T> = std::result::Result<T, OntoRankError>;
