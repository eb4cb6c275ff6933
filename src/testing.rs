//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::core::identity::GraphKind;
use crate::db::{
    Configuration, Dataset, GraphMeta, InMemoryGraphStore, ResolvedConfiguration, Tagging,
    TaggingEntry,
};
use crate::toolkit::lexical::{
    Corpora, CorpusTagger, Language, LexicalCorpus, LexicalScorer, OrdVevCorpus, OrdVevDocument,
    PartOfSpeech, SynsetId, TermExtractor, WordNetCorpus, WordNetDocument,
};
use crate::toolkit::matrix::{Matrix, TracingProgress, build_ccs};
use crate::toolkit::ontology::{Concept, Taxonomy};
use crate::toolkit::search::QueryScorer;

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// R at the top, A and B below it, A1 below A.
pub fn scenario_taxonomy() -> Taxonomy {
    let concepts = vec![
        Concept::new("urn:R").with_pref_label("entity", "en"),
        Concept::new("urn:A").with_pref_label("dog", "en").with_broader("urn:R"),
        Concept::new("urn:B").with_pref_label("cat", "en").with_broader("urn:R"),
        Concept::new("urn:A1").with_pref_label("puppy", "en").with_broader("urn:A"),
    ];
    Taxonomy::new(concepts, Some("urn:R".to_string())).unwrap()
}

pub fn scenario_ccs() -> Matrix {
    build_ccs(&scenario_taxonomy(), &TracingProgress).unwrap()
}

pub fn tagging(kind: GraphKind, entries: &[(&str, &str, f64)]) -> Tagging {
    Tagging {
        kind,
        version: format!("{kind}-1"),
        entries: entries
            .iter()
            .map(|(dataset, concept, score)| TaggingEntry {
                dataset: dataset.to_string(),
                concept: concept.to_string(),
                score: *score,
            })
            .collect(),
    }
}


pub fn scenario_wordnet() -> WordNetCorpus {
    let document: WordNetDocument = serde_json::from_value(serde_json::json!({
        "synsets": [
            {"id": "entity.n.01", "pos": "n", "lemmas": ["entity"]},
            {"id": "animal.n.01", "pos": "n", "lemmas": ["animal"], "hypernyms": ["entity.n.01"]},
            {"id": "dog.n.01", "pos": "n", "lemmas": ["dog", "domestic_dog"], "hypernyms": ["animal.n.01"]},
            {"id": "cat.n.01", "pos": "n", "lemmas": ["cat"], "hypernyms": ["animal.n.01"]},
            {"id": "young_animal.n.01", "pos": "n", "lemmas": ["young_animal"], "hypernyms": ["animal.n.01"]},
            {"id": "puppy.n.01", "pos": "n", "lemmas": ["puppy"], "hypernyms": ["dog.n.01", "young_animal.n.01"]},
            {"id": "food.n.01", "pos": "n", "lemmas": ["food"], "hypernyms": ["entity.n.01"]},
            {"id": "ice.n.01", "pos": "n", "lemmas": ["ice"], "hypernyms": ["entity.n.01"]},
            {"id": "ice_cream.n.01", "pos": "n", "lemmas": ["ice_cream"], "hypernyms": ["food.n.01"]},
            {"id": "ice_cream_sandwich.n.01", "pos": "n", "lemmas": ["ice_cream_sandwich"], "hypernyms": ["food.n.01"]},
            {"id": "vanilla.a.01", "pos": "s", "lemmas": ["vanilla"]},
            {"id": "run.v.01", "pos": "v", "lemmas": ["run"]},
            {"id": "eat.v.01", "pos": "v", "lemmas": ["eat"]},
            {"id": "fast.r.01", "pos": "r", "lemmas": ["fast"]}
        ]
    }))
    .unwrap();
    WordNetCorpus::new(document).unwrap()
}

pub fn scenario_ordvev() -> OrdVevCorpus {
    let document: OrdVevDocument = serde_json::from_value(serde_json::json!({
        "words": [
            {"id": "w:hund", "lexical_form": "hund"},
            {"id": "w:katt", "lexical_form": "katt"},
            {"id": "w:is", "lexical_form": "is krem"},
            {"id": "w:løs", "lexical_form": "løs"}
        ],
        "senses": [
            {"id": "s:hund", "word": "w:hund"},
            {"id": "s:katt", "word": "w:katt"},
            {"id": "s:is", "word": "w:is"},
            {"id": "s:løs", "word": "w:løs"}
        ],
        "synsets": [
            {"id": "syn:entitet"},
            {"id": "syn:dyr", "hyponym_of": ["syn:entitet"]},
            {"id": "syn:hund", "label": "hund", "senses": ["s:hund"], "hyponym_of": ["syn:dyr"]},
            {"id": "syn:katt", "label": "katt", "senses": ["s:katt"], "hyponym_of": ["syn:dyr"]},
            {"id": "syn:is_krem", "senses": ["s:is"], "hyponym_of": ["syn:entitet"]},
            {"id": "syn:løs", "senses": ["s:løs"]}
        ]
    }))
    .unwrap();
    OrdVevCorpus::new(document).unwrap()
}

pub fn scenario_extractor() -> TermExtractor {
    let corpus: Arc<dyn LexicalCorpus> = Arc::new(scenario_wordnet());
    TermExtractor::new(Arc::new(CorpusTagger::new(Arc::clone(&corpus))), corpus)
}


/// Corpus with hand-set similarities between synsets.
#[derive(Default)]
pub struct FixedCorpus {
    words: HashMap<String, Vec<SynsetId>>,
    scores: HashMap<(String, String), f64>,
}

impl FixedCorpus {
    pub fn word(mut self, word: &str, synset: &str) -> Self {
        self.words
            .entry(word.to_string())
            .or_default()
            .push(synset.to_string());
        self
    }

    pub fn score(mut self, first: &str, second: &str, score: f64) -> Self {
        self.scores.insert((first.to_string(), second.to_string()), score);
        self.scores.insert((second.to_string(), first.to_string()), score);
        self
    }
}

impl LexicalCorpus for FixedCorpus {
    fn language(&self) -> Language {
        Language::English
    }

    fn synsets(&self, word: &str, _pos: PartOfSpeech) -> Vec<SynsetId> {
        self.words.get(word).cloned().unwrap_or_default()
    }

    fn similarity(&self, first: &str, second: &str) -> Option<f64> {
        if first == second {
            return Some(1.0);
        }
        self.scores.get(&(first.to_string(), second.to_string())).copied()
    }
}

/// "hound" matches the label of urn:A at 0.9 and nothing else.
pub fn fixed_corpus() -> FixedCorpus {
    FixedCorpus::default()
        .word("hound", "s:hound")
        .word("dog", "s:dog")
        .word("cat", "s:cat")
        .score("s:hound", "s:dog", 0.9)
}

pub fn fixed_corpora() -> Corpora {
    Corpora::new().with(Arc::new(fixed_corpus()))
}

pub fn fixed_scorer() -> QueryScorer {
    let corpus: Arc<dyn LexicalCorpus> = Arc::new(fixed_corpus());
    let extractor = TermExtractor::new(Arc::new(CorpusTagger::new(Arc::clone(&corpus))), corpus);
    let lexical = Arc::new(LexicalScorer::new(Arc::new(extractor)));
    let labels = lexical.index_labels(&scenario_taxonomy());
    QueryScorer::new(lexical, Arc::new(labels), Language::English)
}


pub fn resolved_configuration() -> ResolvedConfiguration {
    ResolvedConfiguration {
        id: "cfg-1".to_string(),
        ontology: "onto-1".to_string(),
        dataset: "ds-1".to_string(),
        similarity: "sim-1".to_string(),
        autotag: "auto-1".to_string(),
    }
}

pub fn tagging_meta(kind: GraphKind, version: &str, last_modified: DateTime<Utc>) -> GraphMeta {
    GraphMeta {
        kind,
        version: version.to_string(),
        last_modified,
        dataset: Some("ds-1".to_string()),
        ontology: Some("onto-1".to_string()),
    }
}

fn dataset(uri: &str, title: &str) -> Dataset {
    Dataset {
        uri: uri.to_string(),
        title: Some(title.to_string()),
        description: None,
        landing_page: None,
    }
}

/// One configuration over the scenario taxonomy: D tagged with A by
/// similarity, E tagged with B by autotag.
pub fn scenario_store() -> InMemoryGraphStore {
    let store = InMemoryGraphStore::new(None);
    store.insert_ontology("onto-1", ts(100), scenario_taxonomy());
    store.insert_datasets(
        "ds-1",
        ts(100),
        vec![
            dataset("urn:D", "Dataset D"),
            dataset("urn:E", "Dataset E"),
            dataset("urn:F", "Dataset F"),
        ],
    );
    store
        .insert_tagging(
            tagging_meta(GraphKind::Similarity, "sim-1", ts(200)),
            vec![TaggingEntry {
                dataset: "urn:D".to_string(),
                concept: "urn:A".to_string(),
                score: 0.8,
            }],
        )
        .unwrap();
    store
        .insert_tagging(
            tagging_meta(GraphKind::Autotag, "auto-1", ts(300)),
            vec![TaggingEntry {
                dataset: "urn:E".to_string(),
                concept: "urn:B".to_string(),
                score: 0.9,
            }],
        )
        .unwrap();
    store.insert_configuration(Configuration {
        id: "cfg-1".to_string(),
        label: None,
        similarity: "sim-1".to_string(),
        autotag: "auto-1".to_string(),
        dataset: None,
        ontology: None,
    });
    store
}
