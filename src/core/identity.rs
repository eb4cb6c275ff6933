use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::{Display, EnumString, IntoStaticStr};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GraphKind {
    Ontology,
    Dataset,
    Similarity,
    Autotag,
}

impl GraphKind {
    pub fn is_tagging(self) -> bool {
        matches!(self, Self::Similarity | Self::Autotag)
    }
}


/// Versioning key of a cached matrix. Two matrices are the same artifact
/// only when every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatrixIdentity {
    pub kind: GraphKind,
    pub version: String,
    pub last_modified: DateTime<Utc>,
    pub parameters: Vec<String>,
}

impl MatrixIdentity {
    pub fn new(kind: GraphKind, version: impl Into<String>, last_modified: DateTime<Utc>) -> Self {
        Self {
            kind,
            version: version.into(),
            last_modified,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: impl ToString) -> Self {
        self.parameters.push(parameter.to_string());
        self
    }

    /// Identity of a concept-concept matrix.
    pub fn ccs(ontology_version: &str, ontology_modified: DateTime<Utc>) -> Self {
        Self::new(GraphKind::Ontology, ontology_version, ontology_modified)
    }

    /// Identity of a concept-dataset matrix. The ontology version takes part
    /// in the key since the matrix is derived through the concept matrix.
    pub fn cds(
        kind: GraphKind,
        tagging_version: &str,
        tagging_modified: DateTime<Utc>,
        ontology: &MatrixIdentity,
        concept_relevance_threshold: f64,
    ) -> Self {
        Self::new(kind, tagging_version, tagging_modified)
            .with_parameter(concept_relevance_threshold)
            .with_parameter(&ontology.version)
            .with_parameter(ontology.last_modified.to_rfc3339())
    }

    pub fn storage_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(<&'static str>::from(self.kind).as_bytes());
        hasher.update([0u8]);
        hasher.update(self.version.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.last_modified.to_rfc3339().as_bytes());
        for parameter in &self.parameters {
            hasher.update([0u8]);
            hasher.update(parameter.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_identity_equality_is_exact() {
        let onto = MatrixIdentity::ccs("onto-1", ts(10));
        let a = MatrixIdentity::cds(GraphKind::Similarity, "sim-1", ts(20), &onto, 0.0);
        let b = MatrixIdentity::cds(GraphKind::Similarity, "sim-1", ts(20), &onto, 0.0);
        let newer = MatrixIdentity::cds(GraphKind::Similarity, "sim-1", ts(21), &onto, 0.0);
        let other_tc = MatrixIdentity::cds(GraphKind::Similarity, "sim-1", ts(20), &onto, 0.1);

        assert_eq!(a, b);
        assert_eq!(a.storage_key(), b.storage_key());
        assert_ne!(a, newer);
        assert_ne!(a, other_tc);
        assert_ne!(a.storage_key(), other_tc.storage_key());
    }

    #[test]
    fn test_graph_kind_strings() {
        assert_eq!(GraphKind::Autotag.to_string(), "autotag");
        assert_eq!("ontology".parse::<GraphKind>().unwrap(), GraphKind::Ontology);
        assert!(GraphKind::Similarity.is_tagging());
        assert!(!GraphKind::Dataset.is_tagging());
    }
}
