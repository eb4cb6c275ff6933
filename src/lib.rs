

pub mod core;
pub mod db;
pub mod toolkit;
pub mod utils;

#[cfg(test)]
mod testing;

pub use crate::utils::{safe_truncate_ellipsis, uri_fragment};


pub use crate::core::config::OntoRankConfig;
pub use crate::core::error::{OntoRankError, Result};
pub use crate::db::{GraphStore, MatrixStore};
pub use crate::toolkit::search::{ConfigurationSelector, EngineLoader, RankingEngine, SearchRequest, SearchResponse};


pub const DEFAULT_MATRIX_CACHE_CAPACITY: usize = 64;
