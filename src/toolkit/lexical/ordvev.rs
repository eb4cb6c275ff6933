use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Language, LexicalCorpus, PartOfSpeech, SynsetId};
use crate::core::error::Result;
use crate::toolkit::ontology::wu_palmer_paths;


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: String,
    pub lexical_form: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenseRecord {
    pub id: String,
    pub word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdVevSynset {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub senses: Vec<String>,
    #[serde(default)]
    pub hyponym_of: Vec<String>,
}

/// Export of the word, word sense and synset graphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdVevDocument {
    #[serde(default)]
    pub words: Vec<WordRecord>,
    #[serde(default)]
    pub senses: Vec<SenseRecord>,
    #[serde(default)]
    pub synsets: Vec<OrdVevSynset>,
}


/// Norwegian Bokmål corpus. Lexical forms lead to synsets through word
/// senses; similarity follows only the first hypernym of each synset.
#[derive(Debug)]
pub struct OrdVevCorpus {
    forms: HashMap<String, Vec<SynsetId>>,
    hypernym: HashMap<String, String>,
    labels: HashMap<String, String>,
}

impl OrdVevCorpus {
    pub fn new(document: OrdVevDocument) -> Result<Self> {
        let mut synsets_by_sense: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut hypernym = HashMap::new();
        let mut labels = HashMap::new();
        for synset in &document.synsets {
            for sense in &synset.senses {
                synsets_by_sense
                    .entry(sense.as_str())
                    .or_default()
                    .push(synset.id.as_str());
            }
            if let Some(parent) = synset.hyponym_of.first() {
                hypernym.insert(synset.id.clone(), parent.clone());
            }
            if let Some(label) = &synset.label {
                labels.insert(synset.id.clone(), label.clone());
            }
        }

        let mut senses_by_word: HashMap<&str, Vec<&str>> = HashMap::new();
        for sense in &document.senses {
            senses_by_word
                .entry(sense.word.as_str())
                .or_default()
                .push(sense.id.as_str());
        }

        let mut forms: HashMap<String, Vec<SynsetId>> = HashMap::new();
        for word in &document.words {
            let key = word.lexical_form.to_lowercase().replace(' ', "_");
            let found = forms.entry(key).or_default();
            for sense in senses_by_word.get(word.id.as_str()).into_iter().flatten() {
                for synset in synsets_by_sense.get(sense).into_iter().flatten() {
                    if !found.iter().any(|s| s == synset) {
                        found.push(synset.to_string());
                    }
                }
            }
        }

        debug!(
            "OrdVev corpus with {} lexical forms and {} synsets",
            forms.len(),
            document.synsets.len()
        );
        Ok(Self {
            forms,
            hypernym,
            labels,
        })
    }

    pub fn synset_label(&self, synset: &str) -> Option<&str> {
        self.labels.get(synset).map(String::as_str)
    }

    /// `synset` followed by its first-hypernym chain.
    pub fn hypernym_path<'a>(&'a self, synset: &'a str) -> Vec<&'a str> {
        let mut path = vec![synset];
        let mut current = synset;
        while let Some(parent) = self.hypernym.get(current) {
            if path.contains(&parent.as_str()) {
                warn!("Cycle in hyponymOf relations at {}", parent);
                break;
            }
            path.push(parent.as_str());
            current = parent.as_str();
        }
        path
    }

    pub fn depth(&self, synset: &str) -> usize {
        self.hypernym_path(synset).len()
    }
}


impl LexicalCorpus for OrdVevCorpus {
    fn language(&self) -> Language {
        Language::Norwegian
    }

    /// The word graph carries no part of speech, so `pos` is ignored.
    fn synsets(&self, word: &str, _pos: PartOfSpeech) -> Vec<SynsetId> {
        self.forms.get(&word.to_lowercase()).cloned().unwrap_or_default()
    }

    fn similarity(&self, first: &str, second: &str) -> Option<f64> {
        wu_palmer_paths(&self.hypernym_path(first), &self.hypernym_path(second))
    }
}
