use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{Concept, OntologyStats};
use crate::toolkit::matrix::ConceptIndex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Concept not found: {0}")]
    NotFound(String),
    #[error("Concept defined twice: {0}")]
    Duplicate(String),
    #[error("No common subsumer for <{first}> and <{second}>")]
    Disconnected { first: String, second: String },
}


/// Serialized form of a concept scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxonomyDocument {
    #[serde(default)]
    pub top_concept: Option<String>,
    pub concepts: Vec<Concept>,
}


/// Read-only view of one concept scheme. Ancestry follows only the first
/// broader edge of every concept.
#[derive(Debug)]
pub struct Taxonomy {
    concepts: Vec<Concept>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<String>>,
    top_concept: Option<String>,
    index: Arc<ConceptIndex>,
}

impl Taxonomy {
    pub fn new(concepts: Vec<Concept>, top_concept: Option<String>) -> Result<Self, HierarchyError> {
        let mut positions = HashMap::with_capacity(concepts.len());
        let mut children: HashMap<String, Vec<String>> = HashMap::new();

        for (i, concept) in concepts.iter().enumerate() {
            if positions.insert(concept.uri.clone(), i).is_some() {
                return Err(HierarchyError::Duplicate(concept.uri.clone()));
            }
            for parent in &concept.broader {
                children
                    .entry(parent.clone())
                    .or_default()
                    .push(concept.uri.clone());
            }
        }

        if let Some(top) = &top_concept {
            if !positions.contains_key(top) {
                return Err(HierarchyError::NotFound(top.clone()));
            }
        }

        let index = Arc::new(ConceptIndex::new(
            concepts.iter().map(|c| c.uri.clone()).collect(),
        ));

        debug!("Taxonomy built with {} concepts", concepts.len());
        Ok(Self {
            concepts,
            positions,
            children,
            top_concept,
            index,
        })
    }

    pub fn from_document(document: TaxonomyDocument) -> Result<Self, HierarchyError> {
        Self::new(document.concepts, document.top_concept)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn concepts(&self) -> &[Concept] {
        &self.concepts
    }

    pub fn concept(&self, uri: &str) -> Option<&Concept> {
        self.positions.get(uri).map(|&i| &self.concepts[i])
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.positions.contains_key(uri)
    }

    pub fn index(&self) -> &Arc<ConceptIndex> {
        &self.index
    }

    /// The scheme's top concept, or the first concept without a broader edge.
    pub fn root(&self) -> Option<&str> {
        self.top_concept.as_deref().or_else(|| {
            self.concepts
                .iter()
                .find(|c| c.broader.is_empty())
                .map(|c| c.uri.as_str())
        })
    }

    /// First-parent semantics: at most one parent is reported.
    pub fn parents(&self, uri: &str) -> Option<&str> {
        self.concept(uri).and_then(Concept::first_parent)
    }

    pub fn children(&self, uri: &str) -> &[String] {
        self.children.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn siblings(&self, uri: &str) -> Vec<&str> {
        let Some(concept) = self.concept(uri) else { return Vec::new() };
        let mut seen = HashSet::new();
        concept
            .broader
            .iter()
            .flat_map(|p| self.children(p))
            .map(String::as_str)
            .filter(|c| *c != uri && seen.insert(*c))
            .collect()
    }

    /// The concept itself followed by every concept below it, depth first.
    pub fn descendants<'a>(&'a self, uri: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![uri];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            out.push(node);
            for child in self.children(node).iter().rev() {
                stack.push(child.as_str());
            }
        }
        out
    }

    /// `uri` followed by its first-parent ancestors up to a root.
    pub fn parent_path<'a>(&'a self, uri: &'a str) -> Vec<&'a str> {
        let mut path = vec![uri];
        let mut current = uri;
        while let Some(parent) = self.parents(current) {
            if path.contains(&parent) {
                warn!("Cycle in broader relations at <{}>", parent);
                break;
            }
            path.push(parent);
            current = parent;
        }
        path
    }

    /// Number of nodes on the first-parent chain, so a root has depth 1.
    pub fn depth(&self, uri: &str) -> usize {
        self.parent_path(uri).len()
    }

    pub fn stats(&self) -> OntologyStats {
        OntologyStats {
            total_concepts: self.concepts.len(),
            total_relations: self.concepts.iter().map(|c| c.broader.len()).sum(),
            root: self.root().map(str::to_string),
            max_depth: self
                .concepts
                .iter()
                .map(|c| self.depth(&c.uri))
                .max()
                .unwrap_or(0),
        }
    }
}
