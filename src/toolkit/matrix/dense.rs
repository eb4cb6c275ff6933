use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::error::{OntoRankError, Result};


/// Stable concept-to-column mapping shared by the concept matrix and every
/// concept-dataset matrix of one ontology version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ConceptIndex {
    concepts: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ConceptIndex {
    pub fn new(concepts: Vec<String>) -> Self {
        let positions = concepts
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { concepts, positions }
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn position(&self, concept: &str) -> Option<usize> {
        self.positions.get(concept).copied()
    }

    pub fn concept(&self, position: usize) -> Option<&str> {
        self.concepts.get(position).map(String::as_str)
    }

    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }
}

impl From<Vec<String>> for ConceptIndex {
    fn from(concepts: Vec<String>) -> Self {
        Self::new(concepts)
    }
}

impl From<ConceptIndex> for Vec<String> {
    fn from(index: ConceptIndex) -> Self {
        index.concepts
    }
}


/// Row-major matrix with labelled rows and concept-indexed columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: Vec<String>,
    columns: Arc<ConceptIndex>,
    values: Vec<f64>,
}

impl Matrix {
    pub fn new(rows: Vec<String>, columns: Arc<ConceptIndex>, values: Vec<f64>) -> Result<Self> {
        if rows.len() * columns.len() != values.len() {
            return Err(OntoRankError::Internal(format!(
                "matrix shape {}x{} does not fit {} values",
                rows.len(),
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { rows, columns, values })
    }

    /// Square concept x concept matrix; `values` must hold `n * n` cells.
    pub fn square(columns: Arc<ConceptIndex>, values: Vec<f64>) -> Self {
        debug_assert_eq!(columns.len() * columns.len(), values.len());
        Self {
            rows: columns.concepts().to_vec(),
            columns,
            values,
        }
    }

    pub fn empty(columns: Arc<ConceptIndex>) -> Self {
        Self {
            rows: Vec::new(),
            columns,
            values: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn columns(&self) -> &Arc<ConceptIndex> {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.column_count();
        &self.values[index * width..(index + 1) * width]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = (&str, &[f64])> {
        let width = self.column_count().max(1);
        self.rows
            .iter()
            .map(String::as_str)
            .zip(self.values.chunks(width))
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.column_count() + column]
    }

    pub fn row_position(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r == label)
    }

    /// Row-wise concatenation; both matrices must share the column index.
    pub fn concat(&self, other: &Matrix) -> Result<Matrix> {
        if self.columns != other.columns {
            return Err(OntoRankError::Internal(
                "cannot concatenate matrices over different concept indices".to_string(),
            ));
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);
        Ok(Matrix {
            rows,
            columns: Arc::clone(&self.columns),
            values,
        })
    }

    /// Point the columns at the shared index of the live taxonomy. Fails when
    /// the stored concept order differs from it.
    pub fn rebind_columns(mut self, index: &Arc<ConceptIndex>) -> Result<Matrix> {
        if self.columns.concepts() != index.concepts() {
            return Err(OntoRankError::Storage(
                "stored matrix columns do not match the taxonomy's concept index".to_string(),
            ));
        }
        if self.rows.len() * index.len() != self.values.len() {
            return Err(OntoRankError::Storage(format!(
                "stored matrix has {} values for {} rows",
                self.values.len(),
                self.rows.len()
            )));
        }
        self.columns = Arc::clone(index);
        Ok(self)
    }
}


pub fn cosine_similarity(vec1: &[f64], vec2: &[f64]) -> f64 {
    if vec1.len() != vec2.len() || vec1.is_empty() {
        return 0.0;
    }

    let dot_product: f64 = vec1.iter().zip(vec2.iter()).map(|(a, b)| a * b).sum();
    let mag1: f64 = vec1.iter().map(|a| a * a).sum::<f64>().sqrt();
    let mag2: f64 = vec2.iter().map(|b| b * b).sum::<f64>().sqrt();

    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    dot_product / (mag1 * mag2)
}
