pub mod lstm_classifier;

pub use lstm_classifier::{LstmClassifier, LstmClassifierConfig};

use std::path::Path;

use candle_core::Device;

use crate::core::Result;
use crate::metrics::{binary_accuracy, binary_crossentropy};
use crate::sequences::PaddedBatch;

/// Loss and accuracy (as a fraction) of a model on a labelled batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelScore {
    pub loss: f64,
    pub accuracy: f64,
}

impl ModelScore {
    /// Binary cross-entropy and binary accuracy at `threshold`.
    pub fn from_probabilities(probabilities: &[f32], labels: &[u8], threshold: f32) -> Result<Self> {
        Ok(Self {
            loss: binary_crossentropy(probabilities, labels)?,
            accuracy: binary_accuracy(probabilities, labels, threshold)?,
        })
    }
}

/// Trait every binary text classifier driven by the pipelines implements.
pub trait HateSpeechModel {
    /// Deserializes a trained model from `path` onto `device`.
    fn load(path: &Path, device: &Device) -> Result<Self>
    where
        Self: Sized;

    /// Probability of the positive class for each row of `batch`.
    fn predict(&self, batch: &PaddedBatch) -> Result<Vec<f32>>;

    /// [`predict`](Self::predict) over consecutive chunks of at most
    /// `batch_size` rows, in row order.
    fn predict_batched(&self, batch: &PaddedBatch, batch_size: usize) -> Result<Vec<f32>> {
        let mut probabilities = Vec::with_capacity(batch.rows());
        for chunk in batch.chunks(batch_size) {
            probabilities.extend(self.predict(&chunk)?);
        }
        Ok(probabilities)
    }
}
