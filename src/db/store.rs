

use async_trait::async_trait;

use super::models::{Configuration, Dataset, DatasetInfo, GraphMeta, OntologyGraph, Tagging};
use crate::core::error::Result;
use crate::core::identity::{GraphKind, MatrixIdentity};
use crate::toolkit::matrix::Matrix;


/// Read access to the graphs the engine is assembled from. `Ok(None)` means
/// the identifier does not resolve.
#[async_trait]
pub trait GraphStore: Send + Sync {

    async fn resolve_configuration(&self, id: &str) -> Result<Option<Configuration>>;

    /// The configuration to use when none is named, if any exists.
    async fn default_configuration_id(&self) -> Result<Option<String>>;

    async fn configuration_ids(&self) -> Result<Vec<String>>;


    async fn graph_metadata(&self, kind: GraphKind, version: &str) -> Result<Option<GraphMeta>>;

    async fn load_ontology(&self, version: &str) -> Result<Option<OntologyGraph>>;

    async fn load_datasets(&self, version: &str) -> Result<Option<Vec<Dataset>>>;

    async fn load_tagging(&self, kind: GraphKind, version: &str) -> Result<Option<Tagging>>;

    async fn dataset_info(&self, version: &str, uri: &str) -> Result<Option<DatasetInfo>>;
}


/// Persistent, opaque storage of computed matrices.
#[async_trait]
pub trait MatrixStore: Send + Sync {
    async fn get(&self, identity: &MatrixIdentity) -> Result<Option<Matrix>>;

    async fn put(&self, identity: &MatrixIdentity, matrix: &Matrix) -> Result<()>;
}

