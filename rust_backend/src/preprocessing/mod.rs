pub mod normalizer;
pub mod pipeline;

pub use normalizer::{normalize, normalize_records, NormalizationStats, Normalizer};
pub use pipeline::{preprocess_records, PreprocessConfig, PreprocessPipeline, PreprocessResult};
