use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub text: String,
    pub language: String,
}

impl Label {
    pub fn new(text: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: language.into(),
        }
    }
}


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub uri: String,
    #[serde(default)]
    pub pref_labels: Vec<Label>,
    #[serde(default)]
    pub alt_labels: Vec<Label>,
    /// Broader concepts in discovery order. Only the first one is walked.
    #[serde(default)]
    pub broader: Vec<String>,
}

impl Concept {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            pref_labels: Vec::new(),
            alt_labels: Vec::new(),
            broader: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_pref_label(mut self, text: &str, language: &str) -> Self {
        self.pref_labels.push(Label::new(text, language));
        self
    }

    #[must_use]
    pub fn with_alt_label(mut self, text: &str, language: &str) -> Self {
        self.alt_labels.push(Label::new(text, language));
        self
    }

    #[must_use]
    pub fn with_broader(mut self, parent: &str) -> Self {
        self.broader.push(parent.to_string());
        self
    }

    pub fn first_parent(&self) -> Option<&str> {
        self.broader.first().map(String::as_str)
    }

    /// Preferred labels first, then alternates, restricted to `language`.
    pub fn labels<'a>(&'a self, language: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pref_labels
            .iter()
            .chain(self.alt_labels.iter())
            .filter(move |l| l.language == language)
            .map(|l| l.text.as_str())
    }
}


#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OntologyStats {
    pub total_concepts: usize,
    pub total_relations: usize,
    pub root: Option<String>,
    pub max_depth: usize,
}
