use std::sync::Arc;

use tracing::{info, warn};

use super::dense::Matrix;
use super::progress::{BuildProgress, ProgressSink};
use crate::core::error::{DisconnectedPair, OntoRankError, Result};
use crate::toolkit::ontology::{Taxonomy, wu_palmer_paths};


const STAGE: &str = "Calculating concept-concept similarity";


/// Exact Wu-Palmer similarity for every ordered concept pair. Disconnected
/// pairs do not stop the loop; they are all reported in one error.
pub fn build_ccs(taxonomy: &Taxonomy, progress: &dyn ProgressSink) -> Result<Matrix> {
    let concepts = taxonomy.concepts();
    let n = concepts.len();
    info!("Building concept-concept matrix for {} concepts", n);

    let paths: Vec<Vec<&str>> = concepts
        .iter()
        .map(|c| taxonomy.parent_path(&c.uri))
        .collect();

    let mut values = Vec::with_capacity(n * n);
    let mut disconnected = Vec::new();

    for (i, path1) in paths.iter().enumerate() {
        for (j, path2) in paths.iter().enumerate() {
            if i == j {
                values.push(1.0);
                continue;
            }
            match wu_palmer_paths(path1, path2) {
                Some(score) => values.push(score),
                None => {
                    disconnected.push(DisconnectedPair {
                        first: concepts[i].uri.clone(),
                        second: concepts[j].uri.clone(),
                    });
                    values.push(f64::NAN);
                }
            }
        }
        progress.report(BuildProgress {
            stage: STAGE,
            done: i + 1,
            total: n,
        });
    }

    if !disconnected.is_empty() {
        warn!("{} concept pairs have no common subsumer", disconnected.len());
        return Err(OntoRankError::DisconnectedTaxonomy { pairs: disconnected });
    }

    Ok(Matrix::square(Arc::clone(taxonomy.index()), values))
}
