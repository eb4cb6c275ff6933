use std::sync::Arc;

use tracing::debug;

use crate::core::config::check_unit_interval;
use crate::core::error::{OntoRankError, Result};
use crate::toolkit::lexical::{Language, LabelIndex, LexicalScorer};
use crate::toolkit::matrix::Matrix;


/// Scores a free-text query against every concept of a taxonomy.
#[derive(Clone)]
pub struct QueryScorer {
    lexical: Arc<LexicalScorer>,
    labels: Arc<LabelIndex>,
    language: Language,
}

impl QueryScorer {
    pub fn new(lexical: Arc<LexicalScorer>, labels: Arc<LabelIndex>, language: Language) -> Self {
        Self {
            lexical,
            labels,
            language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Query vector aligned with the columns of `ccs`. Direct matches below
    /// `threshold` are zeroed, then every matched concept lends its score to
    /// the others through the concept matrix.
    pub fn score(&self, query: &str, ccs: &Matrix, threshold: f64) -> Result<Vec<f64>> {
        check_unit_interval("query concept threshold", threshold)?;
        let width = ccs.column_count();
        if self.labels.len() != width {
            return Err(OntoRankError::Internal(format!(
                "label index covers {} concepts, concept matrix {}",
                self.labels.len(),
                width
            )));
        }

        let synsets = self.lexical.query_synsets(query);
        if synsets.is_empty() {
            debug!("No synsets for query {:?}", query);
            return Ok(vec![0.0; width]);
        }

        let raw: Vec<f64> = (0..width)
            .map(|i| {
                let score = self.lexical.concept_score(self.labels.labels(i), &synsets);
                if score < threshold { 0.0 } else { score }
            })
            .collect();

        Ok(enrich(&raw, ccs, threshold))
    }
}

/// `score[c2] = max(score[c2], ccs[c1][c2] * raw[c1])` over distinct pairs,
/// keeping only contributions that reach `threshold`.
pub fn enrich(raw: &[f64], ccs: &Matrix, threshold: f64) -> Vec<f64> {
    let mut scores = raw.to_vec();
    for (c1, &direct) in raw.iter().enumerate() {
        if direct == 0.0 {
            continue;
        }
        for (c2, score) in scores.iter_mut().enumerate() {
            if c1 == c2 {
                continue;
            }
            let candidate = ccs.get(c1, c2) * direct;
            if candidate >= threshold && candidate > *score {
                *score = candidate;
            }
        }
    }
    scores
}
