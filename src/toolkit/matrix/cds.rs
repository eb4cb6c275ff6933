use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::dense::Matrix;
use super::progress::{BuildProgress, ProgressSink};
use crate::core::config::check_unit_interval;
use crate::core::error::{OntoRankError, Result};
use crate::core::identity::GraphKind;
use crate::db::Tagging;


/// Concept-dataset matrix for one tagging set. Each tag spreads its score to
/// every concept through the concept matrix; cells below `threshold` count as
/// zero and datasets left without a nonzero cell are dropped.
pub fn build_cds(
    tagging: &Tagging,
    ccs: &Matrix,
    threshold: f64,
    progress: &dyn ProgressSink,
) -> Result<Matrix> {
    check_unit_interval("concept relevance threshold", threshold)?;

    let index = ccs.columns();
    let width = index.len();
    let stage = match tagging.kind {
        GraphKind::Autotag => "Constructing concept-dataset matrix (autotag)",
        _ => "Constructing concept-dataset matrix (similarity)",
    };
    info!(
        "Building {} concept-dataset matrix from {} tags",
        tagging.kind,
        tagging.entries.len()
    );

    let mut rows: Vec<String> = Vec::new();
    let mut row_of: HashMap<&str, usize> = HashMap::new();
    let mut values: Vec<f64> = Vec::new();

    for (done, entry) in tagging.entries.iter().enumerate() {
        let Some(tagged) = index.position(&entry.concept) else {
            return Err(OntoRankError::UnknownConcept {
                concept: entry.concept.clone(),
                context: format!("{} graph {}", tagging.kind, tagging.version),
            });
        };
        if !(0.0..=1.0).contains(&entry.score) {
            return Err(OntoRankError::Validation(format!(
                "tag score {} for <{}> / <{}> is outside [0, 1]",
                entry.score, entry.dataset, entry.concept
            )));
        }

        let row = *row_of.entry(entry.dataset.as_str()).or_insert_with(|| {
            rows.push(entry.dataset.clone());
            values.resize(values.len() + width, 0.0);
            rows.len() - 1
        });
        let cells = &mut values[row * width..(row + 1) * width];

        for (cs, cell) in cells.iter_mut().enumerate() {
            let mut candidate = ccs.get(cs, tagged) * entry.score;
            if candidate < threshold {
                candidate = 0.0;
            }
            if candidate > *cell {
                *cell = candidate;
            }
        }

        progress.report(BuildProgress {
            stage,
            done: done + 1,
            total: tagging.entries.len(),
        });
    }

    let mut kept_rows = Vec::with_capacity(rows.len());
    let mut kept_values = Vec::with_capacity(values.len());
    for (dataset, cells) in rows.into_iter().zip(values.chunks(width.max(1))) {
        if cells.iter().any(|&v| v > 0.0) {
            kept_rows.push(dataset);
            kept_values.extend_from_slice(cells);
        } else {
            debug!("Dropping <{}>: no concept above threshold", dataset);
        }
    }

    Matrix::new(kept_rows, Arc::clone(index), kept_values)
}
