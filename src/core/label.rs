use std::fmt;

use serde::{Deserialize, Serialize};

/// Label assigned to a single text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionResult {
    HateAndAbusive,
    NoHate,
}

impl PredictionResult {
    /// Single-text decision: positive only strictly above the threshold.
    pub fn from_probability(probability: f32, threshold: f32) -> Self {
        if probability > threshold {
            Self::HateAndAbusive
        } else {
            Self::NoHate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HateAndAbusive => "hate and abusive",
            Self::NoHate => "no hate",
        }
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a model evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub is_model_accepted: bool,
}

impl EvaluationResult {
    /// `accuracy` is a percentage; the boundary itself is accepted.
    pub fn from_accuracy(accuracy: f64, threshold: f64) -> Self {
        Self {
            is_model_accepted: accuracy >= threshold,
        }
    }
}

/// Class used when building the diagnostic confusion matrix.
///
/// Unlike [`PredictionResult::from_probability`] the threshold itself counts
/// as positive here.
pub fn binarize(probability: f32, threshold: f32) -> u8 {
    u8::from(probability >= threshold)
}
