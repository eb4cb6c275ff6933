use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::stopwords::is_stop_word;
use super::tagger::PosTagger;
use super::{LexicalCorpus, PartOfSpeech, SynsetId};

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+(?:['\-][\p{L}\p{N}]+)*").unwrap();
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub text: String,
    pub pos: PartOfSpeech,
}

impl Term {
    pub fn new(text: impl Into<String>, pos: PartOfSpeech) -> Self {
        Self {
            text: text.into(),
            pos,
        }
    }
}


/// Turns free text into lookup terms: noun-phrase words, lower-cased, stop
/// words removed, with runs of words merged when the corpus knows the
/// compound.
pub struct TermExtractor {
    tagger: Arc<dyn PosTagger>,
    corpus: Arc<dyn LexicalCorpus>,
}

impl TermExtractor {
    pub fn new(tagger: Arc<dyn PosTagger>, corpus: Arc<dyn LexicalCorpus>) -> Self {
        Self { tagger, corpus }
    }

    pub fn corpus(&self) -> &Arc<dyn LexicalCorpus> {
        &self.corpus
    }

    pub fn tokenize(text: &str) -> Vec<String> {
        WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
    }

    /// Single words that survive tagging, chunking and stop-word removal.
    pub fn words(&self, text: &str) -> Vec<Term> {
        let tokens = Self::tokenize(text);
        let language = self.corpus.language();

        let tagged: Vec<(String, PartOfSpeech)> = match tokens.len() {
            0 => return Vec::new(),
            1 => vec![(tokens[0].to_lowercase(), PartOfSpeech::Any)],
            _ => self
                .tagger
                .tag(&tokens)
                .into_iter()
                .filter(|(_, tag)| in_noun_phrase(tag))
                .map(|(token, tag)| (token.to_lowercase(), PartOfSpeech::from_penn(&tag)))
                .collect(),
        };

        tagged
            .into_iter()
            .filter(|(word, _)| !is_stop_word(language, word))
            .map(|(word, pos)| Term::new(word, pos))
            .collect()
    }

    /// Terms in text order. Three-word compounds are tried before two-word
    /// ones and a word joins at most one compound.
    pub fn extract(&self, text: &str) -> Vec<Term> {
        let words = self.words(text);
        let mut consumed = vec![false; words.len()];
        let mut terms: Vec<(usize, Term)> = Vec::new();

        for n in [3, 2] {
            if words.len() < n {
                continue;
            }
            for start in 0..=words.len() - n {
                if consumed[start..start + n].iter().any(|&c| c) {
                    continue;
                }
                let joined = words[start..start + n]
                    .iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join("_");
                if self.corpus.synsets(&joined, PartOfSpeech::Any).is_empty() {
                    continue;
                }
                consumed[start..start + n].iter_mut().for_each(|c| *c = true);
                terms.push((start, Term::new(joined, PartOfSpeech::Any)));
            }
        }

        for (i, word) in words.into_iter().enumerate() {
            if !consumed[i] {
                terms.push((i, word));
            }
        }
        terms.sort_by_key(|(start, _)| *start);

        debug!("Extracted {} terms from {:?}", terms.len(), text);
        terms.into_iter().map(|(_, term)| term).collect()
    }

    /// One synset set per extracted term.
    pub fn synset_sets(&self, text: &str) -> Vec<Vec<SynsetId>> {
        self.extract(text)
            .into_iter()
            .map(|term| self.corpus.synsets(&term.text, term.pos))
            .collect()
    }
}

/// Nouns, adjectives, verbs and foreign words form the noun-phrase chunks
/// terms are taken from.
fn in_noun_phrase(tag: &str) -> bool {
    ["NN", "JJ", "VB", "FW"].iter().any(|p| tag.starts_with(p))
}
