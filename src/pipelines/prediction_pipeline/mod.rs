//! Single-text hate speech prediction.
//!
//! Cleans the input, encodes it with the training tokenizer and labels it
//! `"hate and abusive"` or `"no hate"`.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hate_speech::pipelines::prediction_pipeline::*;
//!
//! let pipeline = PredictionPipelineBuilder::lstm().build()?;
//! let label = pipeline.run_pipeline("have a lovely day")?;
//! println!("{label}");
//! # anyhow::Ok(())
//! ```

pub mod builder;
pub mod pipeline;

pub use builder::PredictionPipelineBuilder;
pub use pipeline::PredictionPipeline;

pub use crate::core::PredictionResult;
