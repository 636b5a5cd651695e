pub mod aggregator;
pub mod normalizer;
pub mod pipeline;
pub mod resolver;

pub use aggregator::Aggregator;
pub use normalizer::SpreadsheetNormalizer;
pub use pipeline::ReconcilePipeline;
pub use resolver::{MatchPolicy, ReferenceResolver};
