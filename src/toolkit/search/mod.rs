

pub mod engine;
pub mod loader;
pub mod models;
pub mod scoring;

pub use engine::{EngineParts, RankingEngine, TOP_CONCEPTS, Thresholds};
pub use loader::{ConfigurationSelector, EngineLoader};
pub use models::{CdsName, ConceptScore, SearchRequest, SearchResponse, SearchResult};
pub use scoring::{QueryScorer, enrich};
