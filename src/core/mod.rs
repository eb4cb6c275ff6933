

pub mod cache;
pub mod config;
pub mod error;
pub mod identity;

pub use cache::{CacheStats, MatrixCache};
pub use self::config::OntoRankConfig;
pub use error::{OntoRankError, Result};
pub use identity::{GraphKind, MatrixIdentity};
