use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{OntoRankError, Result};
use crate::core::identity::GraphKind;
use crate::toolkit::ontology::Taxonomy;


/// A bound set of graph versions used together for one search deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    pub similarity: String,
    pub autotag: String,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub ontology: Option<String>,
}

/// Equality only looks at the linked graphs.
impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.similarity == other.similarity
            && self.autotag == other.autotag
            && self.dataset == other.dataset
            && self.ontology == other.ontology
    }
}

impl Eq for Configuration {}

impl Configuration {
    /// Check that both tagging sets agree on the dataset and ontology graphs,
    /// and with this configuration where it names them.
    pub fn resolve(&self, similarity: &GraphMeta, autotag: &GraphMeta) -> Result<ResolvedConfiguration> {
        let dataset = self.agree("dataset", self.dataset.as_deref(), similarity, autotag, |m| {
            m.dataset.as_deref()
        })?;
        let ontology = self.agree("ontology", self.ontology.as_deref(), similarity, autotag, |m| {
            m.ontology.as_deref()
        })?;

        Ok(ResolvedConfiguration {
            id: self.id.clone(),
            ontology,
            dataset,
            similarity: self.similarity.clone(),
            autotag: self.autotag.clone(),
        })
    }

    fn agree(
        &self,
        field: &'static str,
        own: Option<&str>,
        similarity: &GraphMeta,
        autotag: &GraphMeta,
        linked: impl Fn(&GraphMeta) -> Option<&str>,
    ) -> Result<String> {
        let inconsistent = |expected: Option<&str>, found: Option<&str>| {
            OntoRankError::InconsistentConfiguration {
                configuration: self.id.clone(),
                field,
                expected: expected.unwrap_or("<unset>").to_string(),
                found: found.unwrap_or("<unset>").to_string(),
            }
        };

        let from_similarity = linked(similarity);
        let from_autotag = linked(autotag);
        if from_similarity != from_autotag {
            return Err(inconsistent(from_similarity, from_autotag));
        }
        match (own, from_similarity) {
            (Some(own), Some(other)) if own != other => Err(inconsistent(Some(own), Some(other))),
            (Some(own), None) => Err(inconsistent(Some(own), None)),
            (Some(own), Some(_)) => Ok(own.to_string()),
            (None, Some(other)) => Ok(other.to_string()),
            (None, None) => Err(inconsistent(None, None)),
        }
    }
}


/// Configuration with every graph id filled in and checked for consistency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfiguration {
    pub id: String,
    pub ontology: String,
    pub dataset: String,
    pub similarity: String,
    pub autotag: String,
}

impl ResolvedConfiguration {
    pub fn tagging_version(&self, kind: GraphKind) -> &str {
        match kind {
            GraphKind::Autotag => &self.autotag,
            _ => &self.similarity,
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub kind: GraphKind,
    pub version: String,
    pub last_modified: DateTime<Utc>,
    /// Dataset graph a tagging set was made against.
    #[serde(default)]
    pub dataset: Option<String>,
    /// Ontology graph a tagging set was made against.
    #[serde(default)]
    pub ontology: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub uri: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub landing_page: Option<String>,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub title: String,
    pub description: String,
    pub uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landing_page: Option<String>,
}

impl DatasetInfo {
    pub fn bare(uri: &str) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            uri: uri.to_string(),
            landing_page: None,
        }
    }
}

impl From<&Dataset> for DatasetInfo {
    fn from(dataset: &Dataset) -> Self {
        Self {
            title: dataset.title.clone().unwrap_or_default(),
            description: dataset.description.clone().unwrap_or_default(),
            uri: dataset.uri.clone(),
            landing_page: dataset.landing_page.clone(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggingEntry {
    pub dataset: String,
    pub concept: String,
    pub score: f64,
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tagging {
    pub kind: GraphKind,
    pub version: String,
    pub entries: Vec<TaggingEntry>,
}


/// A loaded ontology together with the time it was last changed.
#[derive(Debug, Clone)]
pub struct OntologyGraph {
    pub version: String,
    pub last_modified: DateTime<Utc>,
    pub taxonomy: Arc<Taxonomy>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta(kind: GraphKind, dataset: &str, ontology: &str) -> GraphMeta {
        GraphMeta {
            kind,
            version: format!("{kind}-1"),
            last_modified: Utc.timestamp_opt(0, 0).unwrap(),
            dataset: Some(dataset.to_string()),
            ontology: Some(ontology.to_string()),
        }
    }

    fn configuration(dataset: Option<&str>, ontology: Option<&str>) -> Configuration {
        Configuration {
            id: "cfg".to_string(),
            label: None,
            similarity: "similarity-1".to_string(),
            autotag: "autotag-1".to_string(),
            dataset: dataset.map(str::to_string),
            ontology: ontology.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_fills_in_missing_fields() {
        let resolved = configuration(None, None)
            .resolve(
                &meta(GraphKind::Similarity, "ds-1", "onto-1"),
                &meta(GraphKind::Autotag, "ds-1", "onto-1"),
            )
            .unwrap();
        assert_eq!(resolved.dataset, "ds-1");
        assert_eq!(resolved.ontology, "onto-1");
        assert_eq!(resolved.tagging_version(GraphKind::Autotag), "autotag-1");
    }

    #[test]
    fn test_taggings_disagreeing_on_dataset() {
        let err = configuration(None, None)
            .resolve(
                &meta(GraphKind::Similarity, "ds-X", "onto-1"),
                &meta(GraphKind::Autotag, "ds-Y", "onto-1"),
            )
            .unwrap_err();
        match err {
            OntoRankError::InconsistentConfiguration { field, expected, found, .. } => {
                assert_eq!(field, "dataset");
                assert_eq!(expected, "ds-X");
                assert_eq!(found, "ds-Y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_configuration_disagreeing_with_taggings() {
        let err = configuration(Some("ds-1"), Some("onto-2"))
            .resolve(
                &meta(GraphKind::Similarity, "ds-1", "onto-1"),
                &meta(GraphKind::Autotag, "ds-1", "onto-1"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            OntoRankError::InconsistentConfiguration { field: "ontology", .. }
        ));
    }

    #[test]
    fn test_configuration_naming_graph_taggings_do_not_record() {
        let mut similarity = meta(GraphKind::Similarity, "ds-1", "onto-1");
        let mut autotag = meta(GraphKind::Autotag, "ds-1", "onto-1");
        similarity.dataset = None;
        autotag.dataset = None;

        let err = configuration(Some("ds-1"), None)
            .resolve(&similarity, &autotag)
            .unwrap_err();
        match err {
            OntoRankError::InconsistentConfiguration { field, expected, found, .. } => {
                assert_eq!(field, "dataset");
                assert_eq!(expected, "ds-1");
                assert_eq!(found, "<unset>");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_equality_ignores_id_and_label() {
        let mut a = configuration(None, None);
        let mut b = configuration(None, None);
        a.label = Some("first".to_string());
        b.id = "other".to_string();
        assert_eq!(a, b);
        b.autotag = "autotag-2".to_string();
        assert_ne!(a, b);
    }
}
