

pub mod ccs;
pub mod cds;
pub mod dense;
pub mod progress;

pub use ccs::build_ccs;
pub use cds::build_cds;
pub use dense::{ConceptIndex, Matrix, cosine_similarity};
pub use progress::{BuildProgress, ProgressSink, TracingProgress};
