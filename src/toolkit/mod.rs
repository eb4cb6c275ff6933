

pub mod lexical;
pub mod matrix;
pub mod ontology;
pub mod search;


pub use search::{EngineLoader, RankingEngine};
