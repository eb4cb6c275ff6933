

pub mod extractor;
pub mod ordvev;
pub mod similarity;
pub mod stopwords;
pub mod tagger;
pub mod wordnet;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use tracing::info;

use crate::core::error::{OntoRankError, Result};

pub use extractor::{Term, TermExtractor};
pub use ordvev::{OrdVevCorpus, OrdVevDocument};
pub use similarity::{ConceptLabels, LabelIndex, LexicalScorer};
pub use tagger::{CorpusTagger, PosTagger};
pub use wordnet::{WordNetCorpus, WordNetDocument};


#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
    IntoStaticStr,
)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    #[strum(serialize = "en")]
    English,
    #[serde(rename = "nb")]
    #[strum(serialize = "nb")]
    Norwegian,
}

impl Language {
    /// Language tag used on taxonomy labels.
    pub fn code(self) -> &'static str {
        self.into()
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum PartOfSpeech {
    #[serde(rename = "n")]
    #[strum(serialize = "n")]
    Noun,
    #[serde(rename = "v")]
    #[strum(serialize = "v")]
    Verb,
    #[serde(rename = "a", alias = "s")]
    #[strum(serialize = "a")]
    Adjective,
    #[serde(rename = "r")]
    #[strum(serialize = "r")]
    Adverb,
    #[serde(rename = "any")]
    #[strum(serialize = "any")]
    Any,
}

impl PartOfSpeech {
    /// Coarse category of a Penn Treebank tag. Unknown tags match anything.
    pub fn from_penn(tag: &str) -> Self {
        if tag.starts_with("NN") {
            Self::Noun
        } else if tag.starts_with("VB") {
            Self::Verb
        } else if tag.starts_with("JJ") {
            Self::Adjective
        } else if tag.starts_with("RB") {
            Self::Adverb
        } else {
            Self::Any
        }
    }

    pub fn penn(self) -> &'static str {
        match self {
            Self::Noun => "NN",
            Self::Verb => "VB",
            Self::Adjective => "JJ",
            Self::Adverb => "RB",
            Self::Any => "FW",
        }
    }

    pub fn accepts(self, other: PartOfSpeech) -> bool {
        self == Self::Any || self == other
    }
}


pub type SynsetId = String;


/// A lexical database able to map words to synsets and compare synsets.
pub trait LexicalCorpus: Send + Sync {
    fn language(&self) -> Language;

    /// Synsets for `word` restricted to `pos`. Multi-word entries are joined
    /// with underscores.
    fn synsets(&self, word: &str, pos: PartOfSpeech) -> Vec<SynsetId>;

    /// Wu-Palmer similarity, `None` when the synsets share no subsumer.
    fn similarity(&self, first: &str, second: &str) -> Option<f64>;
}


/// Corpora available to the process, one per language.
#[derive(Default, Clone)]
pub struct Corpora {
    corpora: HashMap<Language, Arc<dyn LexicalCorpus>>,
}

impl Corpora {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, corpus: Arc<dyn LexicalCorpus>) -> Self {
        self.corpora.insert(corpus.language(), corpus);
        self
    }

    pub fn get(&self, language: Language) -> Result<Arc<dyn LexicalCorpus>> {
        self.corpora
            .get(&language)
            .cloned()
            .ok_or_else(|| OntoRankError::UnsupportedLanguage(language.to_string()))
    }

    pub fn languages(&self) -> Vec<Language> {
        self.corpora.keys().copied().collect()
    }

    /// Read a JSON corpus export in the format `language` uses.
    pub async fn load(language: Language, path: impl AsRef<Path>) -> Result<Arc<dyn LexicalCorpus>> {
        let raw = tokio::fs::read(path.as_ref()).await?;
        let corpus: Arc<dyn LexicalCorpus> = match language {
            Language::English => {
                let document: WordNetDocument = serde_json::from_slice(&raw)?;
                Arc::new(WordNetCorpus::new(document)?)
            }
            Language::Norwegian => {
                let document: OrdVevDocument = serde_json::from_slice(&raw)?;
                Arc::new(OrdVevCorpus::new(document)?)
            }
        };
        info!("Loaded {} corpus from {}", language, path.as_ref().display());
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::scenario_wordnet;

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::Norwegian.code(), "nb");
        assert_eq!("en".parse::<Language>().unwrap(), Language::English);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(serde_json::to_string(&Language::Norwegian).unwrap(), "\"nb\"");
    }

    #[test]
    fn test_penn_tags() {
        assert_eq!(PartOfSpeech::from_penn("NNS"), PartOfSpeech::Noun);
        assert_eq!(PartOfSpeech::from_penn("VBD"), PartOfSpeech::Verb);
        assert_eq!(PartOfSpeech::from_penn("JJR"), PartOfSpeech::Adjective);
        assert_eq!(PartOfSpeech::from_penn("RB"), PartOfSpeech::Adverb);
        assert_eq!(PartOfSpeech::from_penn("IN"), PartOfSpeech::Any);
        assert!(PartOfSpeech::Any.accepts(PartOfSpeech::Verb));
        assert!(!PartOfSpeech::Noun.accepts(PartOfSpeech::Verb));
    }

    #[test]
    fn test_missing_language_is_reported() {
        let corpora = Corpora::new().with(Arc::new(scenario_wordnet()));
        assert!(corpora.get(Language::English).is_ok());
        assert!(matches!(
            corpora.get(Language::Norwegian),
            Err(OntoRankError::UnsupportedLanguage(code)) if code == "nb"
        ));
    }
}
