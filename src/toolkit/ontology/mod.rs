

pub mod hierarchy;
pub mod models;
pub mod similarity;

pub use hierarchy::{HierarchyError, Taxonomy, TaxonomyDocument};
pub use models::{Concept, Label, OntologyStats};
pub use similarity::{least_common_subsumer_in, wu_palmer_paths};

use crate::core::error::{DisconnectedPair, OntoRankError};

impl From<HierarchyError> for OntoRankError {
    fn from(err: HierarchyError) -> Self {
        match err {
            HierarchyError::Disconnected { first, second } => OntoRankError::DisconnectedTaxonomy {
                pairs: vec![DisconnectedPair { first, second }],
            },
            HierarchyError::NotFound(concept) => OntoRankError::UnknownConcept {
                concept,
                context: "the taxonomy".to_string(),
            },
            HierarchyError::Duplicate(concept) => {
                OntoRankError::Validation(format!("concept <{concept}> is defined twice"))
            }
        }
    }
}
