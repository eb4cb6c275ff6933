

pub mod file;
pub mod memory;
pub mod models;
pub mod store;

pub use file::FileMatrixStore;
pub use memory::{GraphSnapshot, InMemoryGraphStore, InMemoryMatrixStore};
pub use models::{
    Configuration, Dataset, DatasetInfo, GraphMeta, OntologyGraph, ResolvedConfiguration,
    Tagging, TaggingEntry,
};
pub use store::{GraphStore, MatrixStore};
