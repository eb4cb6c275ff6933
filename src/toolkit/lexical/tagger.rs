use std::sync::Arc;

use super::stopwords::is_stop_word;
use super::{LexicalCorpus, PartOfSpeech};


/// Assigns Penn Treebank tags to a token sequence.
pub trait PosTagger: Send + Sync {
    fn tag(&self, tokens: &[String]) -> Vec<(String, String)>;
}


/// Unigram tagger backed by a lexical corpus: a token gets the first
/// category (noun, verb, adjective, adverb) the corpus has synsets for.
pub struct CorpusTagger {
    corpus: Arc<dyn LexicalCorpus>,
}

const CATEGORIES: [PartOfSpeech; 4] = [
    PartOfSpeech::Noun,
    PartOfSpeech::Verb,
    PartOfSpeech::Adjective,
    PartOfSpeech::Adverb,
];

impl CorpusTagger {
    pub fn new(corpus: Arc<dyn LexicalCorpus>) -> Self {
        Self { corpus }
    }

    fn tag_one(&self, token: &str) -> &'static str {
        let word = token.to_lowercase();
        if is_stop_word(self.corpus.language(), &word) {
            return "DT";
        }
        if word.chars().all(|c| c.is_numeric()) {
            return "CD";
        }
        CATEGORIES
            .iter()
            .find(|pos| !self.corpus.synsets(&word, **pos).is_empty())
            .map(|pos| pos.penn())
            .unwrap_or("NN")
    }
}

impl PosTagger for CorpusTagger {
    fn tag(&self, tokens: &[String]) -> Vec<(String, String)> {
        tokens
            .iter()
            .map(|t| (t.clone(), self.tag_one(t).to_string()))
            .collect()
    }
}
