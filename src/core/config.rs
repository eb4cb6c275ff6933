

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{OntoRankError, Result};
use crate::toolkit::lexical::Language;


pub const DEFAULT_SEARCH_RESULT_THRESHOLD: f64 = 0.75;

pub const DEFAULT_CONCEPT_RELEVANCE_THRESHOLD: f64 = 0.0;

pub const DEFAULT_QUERY_CONCEPT_THRESHOLD: f64 = 0.0;


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OntoRankConfig {

    pub language: Language,


    pub search_result_threshold: f64,
    pub concept_relevance_threshold: f64,
    pub query_concept_threshold: f64,


    pub auto_compute: bool,
    pub matrix_cache_capacity: usize,


    pub default_configuration: Option<String>,
    pub snapshot_path: Option<PathBuf>,
    pub matrix_dir: Option<PathBuf>,
    pub corpus_path: Option<PathBuf>,
}

impl OntoRankConfig {

    pub fn new(language: Language) -> Self {
        Self {
            language,
            search_result_threshold: DEFAULT_SEARCH_RESULT_THRESHOLD,
            concept_relevance_threshold: DEFAULT_CONCEPT_RELEVANCE_THRESHOLD,
            query_concept_threshold: DEFAULT_QUERY_CONCEPT_THRESHOLD,
            auto_compute: true,
            matrix_cache_capacity: crate::DEFAULT_MATRIX_CACHE_CAPACITY,
            default_configuration: None,
            snapshot_path: None,
            matrix_dir: None,
            corpus_path: None,
        }
    }


    pub fn from_env() -> Self {
        let mut config = Self::new(
            std::env::var("ONTORANK_LANGUAGE")
                .ok()
                .and_then(|l| l.parse().ok())
                .unwrap_or(Language::English),
        );

        if let Some(t) = env_threshold("ONTORANK_SEARCH_RESULT_THRESHOLD") {
            config.search_result_threshold = t;
        }
        if let Some(t) = env_threshold("ONTORANK_CONCEPT_RELEVANCE_THRESHOLD") {
            config.concept_relevance_threshold = t;
        }
        if let Some(t) = env_threshold("ONTORANK_QUERY_CONCEPT_THRESHOLD") {
            config.query_concept_threshold = t;
        }
        if let Ok(flag) = std::env::var("ONTORANK_AUTO_COMPUTE") {
            config.auto_compute = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(capacity) = std::env::var("ONTORANK_MATRIX_CACHE_CAPACITY")
            .ok()
            .and_then(|c| c.parse().ok())
        {
            config.matrix_cache_capacity = capacity;
        }
        if let Ok(id) = std::env::var("ONTORANK_DEFAULT_CONFIGURATION") {
            config.default_configuration = Some(id);
        }
        if let Ok(path) = std::env::var("ONTORANK_SNAPSHOT_PATH") {
            config.snapshot_path = Some(path.into());
        }
        if let Ok(path) = std::env::var("ONTORANK_MATRIX_DIR") {
            config.matrix_dir = Some(path.into());
        }
        if let Ok(path) = std::env::var("ONTORANK_CORPUS_PATH") {
            config.corpus_path = Some(path.into());
        }

        config
    }

    /// Layer an optional config file under `ONTORANK_*` environment variables.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("ONTORANK").try_parsing(true))
            .build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("search_result_threshold", self.search_result_threshold)?;
        check_unit_interval("concept_relevance_threshold", self.concept_relevance_threshold)?;
        check_unit_interval("query_concept_threshold", self.query_concept_threshold)?;
        if self.matrix_cache_capacity == 0 {
            return Err(OntoRankError::Config(
                "matrix_cache_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for OntoRankConfig {
    fn default() -> Self {
        Self::new(Language::English)
    }
}


pub fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(OntoRankError::Validation(format!(
            "{name} must be between 0 and 1, got {value}"
        )))
    }
}


fn env_threshold(var: &str) -> Option<f64> {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| (0.0..=1.0).contains(v))
}
