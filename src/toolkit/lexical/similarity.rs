use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::extractor::TermExtractor;
use super::{LexicalCorpus, PartOfSpeech, SynsetId};
use crate::toolkit::ontology::Taxonomy;


/// Synsets of each word of each label of one concept.
pub type ConceptLabels = Vec<Vec<Vec<SynsetId>>>;


/// Label synsets of every concept, aligned with the taxonomy's concept index.
#[derive(Debug, Clone, Default)]
pub struct LabelIndex {
    concepts: Vec<ConceptLabels>,
}

impl LabelIndex {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn labels(&self, position: usize) -> &[Vec<Vec<SynsetId>>] {
        self.concepts.get(position).map(Vec::as_slice).unwrap_or(&[])
    }
}


pub struct LexicalScorer {
    extractor: Arc<TermExtractor>,
}

impl LexicalScorer {
    pub fn new(extractor: Arc<TermExtractor>) -> Self {
        Self { extractor }
    }

    fn corpus(&self) -> &Arc<dyn LexicalCorpus> {
        self.extractor.corpus()
    }

    /// Highest similarity between any sense of `word` and any sense of `label`.
    pub fn word_similarity(&self, word: &str, label: &str) -> f64 {
        let corpus = self.corpus();
        let label_synsets = corpus.synsets(label, PartOfSpeech::Any);
        corpus
            .synsets(word, PartOfSpeech::Any)
            .iter()
            .flat_map(|a| label_synsets.iter().filter_map(move |b| corpus.similarity(a, b)))
            .fold(0.0, f64::max)
    }

    /// Distinct synsets of every term in the query.
    pub fn query_synsets(&self, query: &str) -> Vec<SynsetId> {
        let mut seen = HashSet::new();
        self.extractor
            .synset_sets(query)
            .into_iter()
            .flatten()
            .filter(|s| seen.insert(s.clone()))
            .collect()
    }

    pub fn label_synsets(&self, label: &str) -> Vec<Vec<SynsetId>> {
        self.extractor.synset_sets(label)
    }

    /// Best match of one label word against the query.
    pub fn label_word_score(&self, word_synsets: &[SynsetId], query: &[SynsetId]) -> f64 {
        let corpus = self.corpus();
        query
            .iter()
            .flat_map(|q| word_synsets.iter().filter_map(move |c| corpus.similarity(q, c)))
            .fold(0.0, f64::max)
    }

    /// Harmonic mean of the label words that matched at all; 0 when none did.
    pub fn label_similarity(&self, label: &[Vec<SynsetId>], query: &[SynsetId]) -> f64 {
        let matched: Vec<f64> = label
            .iter()
            .map(|word| self.label_word_score(word, query))
            .filter(|&s| s > 0.0)
            .collect();
        harmonic_mean(&matched)
    }

    pub fn concept_score(&self, labels: &[Vec<Vec<SynsetId>>], query: &[SynsetId]) -> f64 {
        labels
            .iter()
            .map(|label| self.label_similarity(label, query))
            .fold(0.0, f64::max)
    }

    /// Label synsets for every concept, in index order.
    pub fn index_labels(&self, taxonomy: &Taxonomy) -> LabelIndex {
        let language = self.corpus().language().code();
        let concepts: Vec<ConceptLabels> = taxonomy
            .index()
            .concepts()
            .iter()
            .map(|uri| {
                taxonomy
                    .concept(uri)
                    .map(|c| {
                        c.labels(language)
                            .map(|l| self.label_synsets(l))
                            .collect::<ConceptLabels>()
                    })
                    .unwrap_or_default()
            })
            .collect();
        debug!("Indexed labels of {} concepts", concepts.len());
        LabelIndex { concepts }
    }
}

pub fn harmonic_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.len() as f64 / values.iter().map(|v| 1.0 / v).sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scenario_extractor, scenario_taxonomy};

    fn scorer() -> LexicalScorer {
        LexicalScorer::new(Arc::new(scenario_extractor()))
    }

    #[test]
    fn test_harmonic_mean() {
        assert_eq!(harmonic_mean(&[]), 0.0);
        assert!((harmonic_mean(&[0.5, 1.0]) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_word_similarity() {
        let scorer = scorer();
        assert_eq!(scorer.word_similarity("dog", "dog"), 1.0);
        assert!((scorer.word_similarity("dog", "cat") - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(scorer.word_similarity("dog", "zebra"), 0.0);
    }

    #[test]
    fn test_unmatched_label_words_are_skipped() {
        let scorer = scorer();
        let query = scorer.query_synsets("dog");
        // "dog" matches fully, "zebra" has no synsets at all
        let label = scorer.label_synsets("dog zebra");
        assert_eq!(scorer.label_similarity(&label, &query), 1.0);

        let label = scorer.label_synsets("dog cat");
        let expected = harmonic_mean(&[1.0, 4.0 / 6.0]);
        assert!((scorer.label_similarity(&label, &query) - expected).abs() < 1e-12);

        assert_eq!(scorer.label_similarity(&scorer.label_synsets("zebra"), &query), 0.0);
    }

    #[test]
    fn test_concept_score_takes_best_label() {
        let scorer = scorer();
        let query = scorer.query_synsets("cat");
        let labels = vec![scorer.label_synsets("dog"), scorer.label_synsets("cat")];
        assert_eq!(scorer.concept_score(&labels, &query), 1.0);
        assert_eq!(scorer.concept_score(&[], &query), 0.0);
    }

    #[test]
    fn test_label_index_is_aligned() {
        let scorer = scorer();
        let taxonomy = scenario_taxonomy();
        let index = scorer.index_labels(&taxonomy);
        assert_eq!(index.len(), taxonomy.len());

        let a = taxonomy.index().position("urn:A").unwrap();
        assert_eq!(index.labels(a)[0], vec![vec!["dog.n.01".to_string()]]);
        assert!(index.labels(99).is_empty());
    }
}
