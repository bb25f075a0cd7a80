pub mod config;
pub mod error;
pub mod label;

pub use config::{PipelineConfig, TrainerArtifacts};
pub use error::{HateSpeechError, PipelineError, Result};
pub use label::{binarize, EvaluationResult, PredictionResult};
