pub mod cleaning;
pub mod core;
pub mod loaders;
pub mod metrics;
pub mod models;
pub mod pipelines;
pub mod sequences;

// Re-export core types
pub use self::core::{
    EvaluationResult, HateSpeechError, PipelineConfig, PipelineError, PredictionResult,
    TrainerArtifacts,
};

pub use models::{HateSpeechModel, LstmClassifier};
