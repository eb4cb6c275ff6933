use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Language, LexicalCorpus, PartOfSpeech, SynsetId};
use crate::core::error::{OntoRankError, Result};

/// Stand-in for the shared root of parts of speech without a single top synset.
const ROOT: usize = usize::MAX;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynsetRecord {
    pub id: String,
    pub pos: PartOfSpeech,
    pub lemmas: Vec<String>,
    #[serde(default)]
    pub hypernyms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WordNetDocument {
    pub synsets: Vec<SynsetRecord>,
}


#[derive(Debug)]
struct Synset {
    id: String,
    pos: PartOfSpeech,
    hypernyms: Vec<usize>,
}


/// English synset graph. Synsets may have several hypernyms.
#[derive(Debug)]
pub struct WordNetCorpus {
    synsets: Vec<Synset>,
    positions: HashMap<String, usize>,
    lemmas: HashMap<String, Vec<usize>>,
    min_depth: Vec<usize>,
    max_depth: Vec<usize>,
}

impl WordNetCorpus {
    pub fn new(document: WordNetDocument) -> Result<Self> {
        let positions: HashMap<String, usize> = document
            .synsets
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), i))
            .collect();

        let mut synsets = Vec::with_capacity(document.synsets.len());
        let mut lemmas: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, record) in document.synsets.into_iter().enumerate() {
            let hypernyms = record
                .hypernyms
                .iter()
                .map(|h| {
                    positions.get(h).copied().ok_or_else(|| {
                        OntoRankError::Validation(format!(
                            "synset {} names unknown hypernym {}",
                            record.id, h
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            for lemma in &record.lemmas {
                lemmas.entry(lemma.to_lowercase()).or_default().push(i);
            }
            synsets.push(Synset {
                id: record.id,
                pos: record.pos,
                hypernyms,
            });
        }

        let mut corpus = Self {
            min_depth: vec![0; synsets.len()],
            max_depth: vec![0; synsets.len()],
            synsets,
            positions,
            lemmas,
        };
        corpus.compute_depths();
        debug!("WordNet corpus with {} synsets", corpus.synsets.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.synsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.synsets.is_empty()
    }

    fn compute_depths(&mut self) {
        let mut state = vec![Visit::Pending; self.synsets.len()];
        for i in 0..self.synsets.len() {
            self.depth_of(i, &mut state);
        }
    }

    fn depth_of(&mut self, i: usize, state: &mut [Visit]) -> (usize, usize) {
        match state[i] {
            Visit::Done => return (self.min_depth[i], self.max_depth[i]),
            Visit::Active => {
                warn!("Cycle in hypernyms at {}", self.synsets[i].id);
                return (0, 0);
            }
            Visit::Pending => {}
        }
        state[i] = Visit::Active;

        let mut min = usize::MAX;
        let mut max = 0;
        let hypernyms = self.synsets[i].hypernyms.clone();
        for h in hypernyms {
            let (hmin, hmax) = self.depth_of(h, state);
            min = min.min(hmin + 1);
            max = max.max(hmax + 1);
        }
        if min == usize::MAX {
            min = 0;
        }

        self.min_depth[i] = min;
        self.max_depth[i] = max;
        state[i] = Visit::Done;
        (min, max)
    }

    /// Shortest distance from `start` to each of its hypernyms, itself included.
    fn hypernym_distances(&self, start: usize, simulate_root: bool) -> HashMap<usize, usize> {
        let mut distances = HashMap::new();
        let mut queue = VecDeque::from([(start, 0)]);
        while let Some((node, distance)) = queue.pop_front() {
            if distances.contains_key(&node) {
                continue;
            }
            distances.insert(node, distance);
            for &h in &self.synsets[node].hypernyms {
                queue.push_back((h, distance + 1));
            }
        }
        if simulate_root {
            let deepest = distances.values().copied().max().unwrap_or(0);
            distances.insert(ROOT, deepest + 1);
        }
        distances
    }

    fn min_depth(&self, node: usize) -> usize {
        if node == ROOT { 0 } else { self.min_depth[node] }
    }

    fn max_depth(&self, node: usize) -> usize {
        if node == ROOT { 0 } else { self.max_depth[node] }
    }

    fn node_id(&self, node: usize) -> &str {
        if node == ROOT { "*ROOT*" } else { &self.synsets[node].id }
    }

    /// Wu-Palmer in the WordNet formulation: the subsumer is the deepest
    /// common hypernym and path lengths are shortest distances to it.
    fn wup(&self, first: usize, second: usize) -> Option<f64> {
        let pos = self.synsets[first].pos;
        if pos != self.synsets[second].pos {
            return None;
        }
        let simulate_root = pos != PartOfSpeech::Noun;

        let from_first = self.hypernym_distances(first, simulate_root);
        let from_second = self.hypernym_distances(second, simulate_root);

        let common: Vec<usize> = from_first
            .keys()
            .copied()
            .filter(|n| from_second.contains_key(n))
            .collect();
        let deepest = common.iter().map(|&n| self.min_depth(n)).max()?;
        let mut lowest: Vec<usize> = common
            .into_iter()
            .filter(|&n| self.min_depth(n) == deepest)
            .collect();
        lowest.sort_by(|a, b| self.node_id(*a).cmp(self.node_id(*b)));

        let subsumer = if lowest.contains(&first) { first } else { lowest[0] };
        let depth = self.max_depth(subsumer) + 1;
        let len1 = from_first[&subsumer] + depth;
        let len2 = from_second[&subsumer] + depth;
        Some(2.0 * depth as f64 / (len1 + len2) as f64)
    }
}

#[derive(Clone, Copy)]
enum Visit {
    Pending,
    Active,
    Done,
}


impl LexicalCorpus for WordNetCorpus {
    fn language(&self) -> Language {
        Language::English
    }

    fn synsets(&self, word: &str, pos: PartOfSpeech) -> Vec<SynsetId> {
        self.lemmas
            .get(&word.to_lowercase())
            .map(|found| {
                found
                    .iter()
                    .filter(|&&i| pos.accepts(self.synsets[i].pos))
                    .map(|&i| self.synsets[i].id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn similarity(&self, first: &str, second: &str) -> Option<f64> {
        let a = *self.positions.get(first)?;
        let b = *self.positions.get(second)?;
        self.wup(a, b)
    }
}
