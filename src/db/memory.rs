use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::models::{Configuration, Dataset, DatasetInfo, GraphMeta, OntologyGraph, Tagging, TaggingEntry};
use super::store::{GraphStore, MatrixStore};
use crate::core::error::{OntoRankError, Result};
use crate::core::identity::{GraphKind, MatrixIdentity};
use crate::toolkit::matrix::Matrix;
use crate::toolkit::ontology::{Concept, Taxonomy};


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyRecord {
    pub version: String,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    pub top_concept: Option<String>,
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub version: String,
    pub last_modified: DateTime<Utc>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingRecord {
    pub kind: GraphKind,
    pub version: String,
    pub last_modified: DateTime<Utc>,
    pub dataset: String,
    pub ontology: String,
    pub entries: Vec<TaggingEntry>,
}

/// JSON document holding every graph a store serves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(default)]
    pub ontologies: Vec<OntologyRecord>,
    #[serde(default)]
    pub datasets: Vec<DatasetRecord>,
    #[serde(default)]
    pub taggings: Vec<TaggingRecord>,
}


#[derive(Default)]
struct Graphs {
    configurations: Vec<Configuration>,
    ontologies: HashMap<String, (GraphMeta, Arc<Taxonomy>)>,
    datasets: HashMap<String, (GraphMeta, Vec<Dataset>)>,
    taggings: HashMap<(GraphKind, String), (GraphMeta, Vec<TaggingEntry>)>,
}


pub struct InMemoryGraphStore {
    graphs: RwLock<Graphs>,
    default_configuration: Option<String>,
}

impl InMemoryGraphStore {
    pub fn new(default_configuration: Option<String>) -> Self {
        Self {
            graphs: RwLock::new(Graphs::default()),
            default_configuration,
        }
    }

    pub fn from_snapshot(snapshot: GraphSnapshot, default_configuration: Option<String>) -> Result<Self> {
        let store = Self::new(default_configuration);
        for record in snapshot.ontologies {
            let taxonomy = Taxonomy::new(record.concepts, record.top_concept)?;
            store.insert_ontology(&record.version, record.last_modified, taxonomy);
        }
        for record in snapshot.datasets {
            store.insert_datasets(&record.version, record.last_modified, record.datasets);
        }
        for record in snapshot.taggings {
            let meta = GraphMeta {
                kind: record.kind,
                version: record.version,
                last_modified: record.last_modified,
                dataset: Some(record.dataset),
                ontology: Some(record.ontology),
            };
            store.insert_tagging(meta, record.entries)?;
        }
        for configuration in snapshot.configurations {
            store.insert_configuration(configuration);
        }
        Ok(store)
    }

    pub async fn load(path: impl AsRef<Path>, default_configuration: Option<String>) -> Result<Self> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let snapshot: GraphSnapshot = serde_json::from_slice(&raw)?;
        info!(
            "Loaded graph snapshot {} ({} configurations)",
            path.as_ref().display(),
            snapshot.configurations.len()
        );
        Self::from_snapshot(snapshot, default_configuration)
    }

    /// Adds or replaces a configuration, keeping its position.
    pub fn insert_configuration(&self, configuration: Configuration) {
        let mut graphs = self.graphs.write();
        match graphs.configurations.iter_mut().find(|c| c.id == configuration.id) {
            Some(existing) => *existing = configuration,
            None => graphs.configurations.push(configuration),
        }
    }

    pub fn insert_ontology(&self, version: &str, last_modified: DateTime<Utc>, taxonomy: Taxonomy) {
        let meta = GraphMeta {
            kind: GraphKind::Ontology,
            version: version.to_string(),
            last_modified,
            dataset: None,
            ontology: None,
        };
        self.graphs
            .write()
            .ontologies
            .insert(version.to_string(), (meta, Arc::new(taxonomy)));
    }

    pub fn insert_datasets(&self, version: &str, last_modified: DateTime<Utc>, datasets: Vec<Dataset>) {
        let meta = GraphMeta {
            kind: GraphKind::Dataset,
            version: version.to_string(),
            last_modified,
            dataset: None,
            ontology: None,
        };
        self.graphs
            .write()
            .datasets
            .insert(version.to_string(), (meta, datasets));
    }

    pub fn insert_tagging(&self, meta: GraphMeta, entries: Vec<TaggingEntry>) -> Result<()> {
        if !meta.kind.is_tagging() {
            return Err(OntoRankError::Validation(format!(
                "{} is not a tagging graph kind",
                meta.kind
            )));
        }
        self.graphs
            .write()
            .taggings
            .insert((meta.kind, meta.version.clone()), (meta, entries));
        Ok(())
    }

    /// Bump a graph's last-modified time, as an edit in the store would.
    pub fn touch(&self, kind: GraphKind, version: &str, last_modified: DateTime<Utc>) -> bool {
        let mut graphs = self.graphs.write();
        let meta = match kind {
            GraphKind::Ontology => graphs.ontologies.get_mut(version).map(|(m, _)| m),
            GraphKind::Dataset => graphs.datasets.get_mut(version).map(|(m, _)| m),
            GraphKind::Similarity | GraphKind::Autotag => graphs
                .taggings
                .get_mut(&(kind, version.to_string()))
                .map(|(m, _)| m),
        };
        match meta {
            Some(meta) => {
                meta.last_modified = last_modified;
                true
            }
            None => false,
        }
    }
}


#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn resolve_configuration(&self, id: &str) -> Result<Option<Configuration>> {
        Ok(self
            .graphs
            .read()
            .configurations
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn default_configuration_id(&self) -> Result<Option<String>> {
        if let Some(id) = &self.default_configuration {
            return Ok(Some(id.clone()));
        }
        let first = self.graphs.read().configurations.first().map(|c| c.id.clone());
        if let Some(id) = &first {
            warn!("No configuration specified, using the first available: {}", id);
        }
        Ok(first)
    }

    async fn configuration_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .graphs
            .read()
            .configurations
            .iter()
            .map(|c| c.id.clone())
            .collect())
    }

    async fn graph_metadata(&self, kind: GraphKind, version: &str) -> Result<Option<GraphMeta>> {
        let graphs = self.graphs.read();
        Ok(match kind {
            GraphKind::Ontology => graphs.ontologies.get(version).map(|(m, _)| m.clone()),
            GraphKind::Dataset => graphs.datasets.get(version).map(|(m, _)| m.clone()),
            GraphKind::Similarity | GraphKind::Autotag => graphs
                .taggings
                .get(&(kind, version.to_string()))
                .map(|(m, _)| m.clone()),
        })
    }

    async fn load_ontology(&self, version: &str) -> Result<Option<OntologyGraph>> {
        Ok(self
            .graphs
            .read()
            .ontologies
            .get(version)
            .map(|(meta, taxonomy)| OntologyGraph {
                version: meta.version.clone(),
                last_modified: meta.last_modified,
                taxonomy: Arc::clone(taxonomy),
            }))
    }

    async fn load_datasets(&self, version: &str) -> Result<Option<Vec<Dataset>>> {
        Ok(self
            .graphs
            .read()
            .datasets
            .get(version)
            .map(|(_, datasets)| datasets.clone()))
    }

    async fn load_tagging(&self, kind: GraphKind, version: &str) -> Result<Option<Tagging>> {
        Ok(self
            .graphs
            .read()
            .taggings
            .get(&(kind, version.to_string()))
            .map(|(meta, entries)| Tagging {
                kind,
                version: meta.version.clone(),
                entries: entries.clone(),
            }))
    }

    async fn dataset_info(&self, version: &str, uri: &str) -> Result<Option<DatasetInfo>> {
        Ok(self.graphs.read().datasets.get(version).and_then(|(_, datasets)| {
            datasets.iter().find(|d| d.uri == uri).map(DatasetInfo::from)
        }))
    }
}


/// Matrix store kept in process memory. Counts writes so callers can tell
/// whether a matrix was recomputed.
#[derive(Default)]
pub struct InMemoryMatrixStore {
    matrices: RwLock<HashMap<MatrixIdentity, Matrix>>,
    writes: AtomicUsize,
}

impl InMemoryMatrixStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.matrices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.read().is_empty()
    }
}

#[async_trait]
impl MatrixStore for InMemoryMatrixStore {
    async fn get(&self, identity: &MatrixIdentity) -> Result<Option<Matrix>> {
        Ok(self.matrices.read().get(identity).cloned())
    }

    async fn put(&self, identity: &MatrixIdentity, matrix: &Matrix) -> Result<()> {
        self.matrices.write().insert(identity.clone(), matrix.clone());
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
