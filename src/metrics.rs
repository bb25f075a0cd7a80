//! Binary classification metrics used during evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{HateSpeechError, Result};

/// Probabilities are clipped to `[EPSILON, 1 - EPSILON]` before taking logs.
const EPSILON: f64 = 1e-7;

/// Confusion matrix for the two classes, negative class first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
    pub tp: usize,
}

impl ConfusionMatrix {
    /// Counts `(truth, prediction)` pairs. Any non-zero value is the positive
    /// class.
    pub fn from_labels(y_true: &[u8], y_pred: &[u8]) -> Result<Self> {
        if y_true.len() != y_pred.len() {
            return Err(HateSpeechError::Shape(format!(
                "{} true labels but {} predictions",
                y_true.len(),
                y_pred.len()
            )));
        }

        let mut matrix = Self::default();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth != 0, pred != 0) {
                (false, false) => matrix.tn += 1,
                (false, true) => matrix.fp += 1,
                (true, false) => matrix.fn_ += 1,
                (true, true) => matrix.tp += 1,
            }
        }
        Ok(matrix)
    }

    pub fn total(&self) -> usize {
        self.tn + self.fp + self.fn_ + self.tp
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Rows are the true class, columns the predicted class.
    pub fn as_array(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .as_array()
            .iter()
            .flatten()
            .map(|n| n.to_string().len())
            .max()
            .unwrap_or(1);
        write!(
            f,
            "[[{:>w$} {:>w$}]\n [{:>w$} {:>w$}]]",
            self.tn,
            self.fp,
            self.fn_,
            self.tp,
            w = width
        )
    }
}

fn check_lengths(probabilities: &[f32], labels: &[u8]) -> Result<()> {
    if probabilities.len() != labels.len() {
        return Err(HateSpeechError::Shape(format!(
            "{} probabilities but {} labels",
            probabilities.len(),
            labels.len()
        )));
    }
    if labels.is_empty() {
        return Err(HateSpeechError::Shape("no samples to score".into()));
    }
    Ok(())
}

/// Fraction of samples whose thresholded probability matches the label.
/// A probability is a positive prediction only when strictly above
/// `threshold`.
pub fn binary_accuracy(probabilities: &[f32], labels: &[u8], threshold: f32) -> Result<f64> {
    check_lengths(probabilities, labels)?;
    let correct = probabilities
        .iter()
        .zip(labels)
        .filter(|(p, label)| (**p > threshold) == (**label != 0))
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

/// Mean binary cross-entropy.
pub fn binary_crossentropy(probabilities: &[f32], labels: &[u8]) -> Result<f64> {
    check_lengths(probabilities, labels)?;
    let total: f64 = probabilities
        .iter()
        .zip(labels)
        .map(|(p, label)| {
            let p = f64::from(*p).clamp(EPSILON, 1.0 - EPSILON);
            if *label != 0 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    Ok(total / labels.len() as f64)
}
