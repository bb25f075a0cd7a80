//! Acceptance check for a freshly trained classifier.
//!
//! Loads the held-out test split written by training, scores the model on it
//! and accepts the model when its accuracy reaches the acceptance threshold.
//!
//! ## Main Types
//!
//! - [`ModelEvaluationPipeline`] - runs the evaluation
//! - [`ModelEvaluationPipelineBuilder`] - configures paths, sequence length and device
//! - [`EvaluationReport`] - loss, accuracy and confusion matrix of one run
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hate_speech::core::TrainerArtifacts;
//! use hate_speech::pipelines::evaluation_pipeline::*;
//! use hate_speech::pipelines::utils::DeviceSelectable;
//!
//! let artifacts = TrainerArtifacts::new(
//!     "artifacts/ModelTrainer/model.safetensors",
//!     "artifacts/ModelTrainer/x_test.csv",
//!     "artifacts/ModelTrainer/y_test.csv",
//! );
//! let pipeline = ModelEvaluationPipelineBuilder::lstm(artifacts).cpu().build()?;
//!
//! let result = pipeline.initiate_model_evaluation()?;
//! println!("accepted: {}", result.is_model_accepted);
//! # anyhow::Ok(())
//! ```

pub mod builder;
pub mod pipeline;

pub use builder::ModelEvaluationPipelineBuilder;
pub use pipeline::{EvaluationReport, ModelEvaluationPipeline};

pub use crate::core::EvaluationResult;
