use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{HateSpeechError, Result};

/// Length every encoded text is padded or truncated to.
pub const MAX_LEN: usize = 300;
/// Upper bound accepted for `max_len`.
pub const MAX_SEQUENCE_LEN: usize = 1 << 16;
/// Rows per forward pass during evaluation.
pub const BATCH_SIZE: usize = 32;
pub const MODEL_NAME: &str = "model.safetensors";
pub const TOKENIZER_FILE: &str = "tokenizer.json";
pub const PREDICT_MODEL_DIR: &str = "artifacts/PredictModel";
pub const TEXT_COLUMN: &str = "tweet";
pub const UNKNOWN_TOKEN: &str = "[UNK]";
/// Minimum test accuracy, in percent, for a trained model to be accepted.
pub const ACCEPTANCE_THRESHOLD: f64 = 80.0;
/// Probability boundary between the negative and positive class.
pub const LABEL_THRESHOLD: f32 = 0.5;

/// Settings shared by the evaluation and prediction pipelines.
///
/// Every field has a default, so a JSON file only needs to name the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_len: usize,
    pub batch_size: usize,
    pub tokenizer_path: PathBuf,
    /// Vocabulary entry whose id marks out-of-vocabulary words. Those ids are
    /// removed from encoded sequences. `None` keeps every id.
    pub unknown_token: Option<String>,
    pub text_column: String,
    pub model_name: String,
    pub predict_model_dir: PathBuf,
    /// Hugging Face Hub repository to fetch `model_name` from instead of
    /// `predict_model_dir`.
    pub model_repo: Option<String>,
    pub acceptance_threshold: f64,
    pub label_threshold: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_len: MAX_LEN,
            batch_size: BATCH_SIZE,
            tokenizer_path: PathBuf::from(TOKENIZER_FILE),
            unknown_token: Some(UNKNOWN_TOKEN.to_string()),
            text_column: TEXT_COLUMN.to_string(),
            model_name: MODEL_NAME.to_string(),
            predict_model_dir: PathBuf::from(PREDICT_MODEL_DIR),
            model_repo: None,
            acceptance_threshold: ACCEPTANCE_THRESHOLD,
            label_threshold: LABEL_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| HateSpeechError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| HateSpeechError::deserialization("pipeline config", path, e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SEQUENCE_LEN).contains(&self.max_len) {
            return Err(HateSpeechError::Config(format!(
                "max_len {} is outside 1..={MAX_SEQUENCE_LEN}",
                self.max_len
            )));
        }
        if self.batch_size == 0 {
            return Err(HateSpeechError::Config("batch_size must be positive".into()));
        }
        if !(0.0..=100.0).contains(&self.acceptance_threshold) {
            return Err(HateSpeechError::Config(format!(
                "acceptance_threshold {} is not a percentage",
                self.acceptance_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.label_threshold) {
            return Err(HateSpeechError::Config(format!(
                "label_threshold {} is not a probability",
                self.label_threshold
            )));
        }
        if self.model_name.is_empty() {
            return Err(HateSpeechError::Config("model_name is empty".into()));
        }
        Ok(())
    }

    /// Local location of the model used for single-text prediction.
    pub fn predict_model_path(&self) -> PathBuf {
        self.predict_model_dir.join(&self.model_name)
    }
}

/// Files produced by the training stage that evaluation consumes.
#[derive(Debug, Clone)]
pub struct TrainerArtifacts {
    pub trained_model_path: PathBuf,
    pub x_test_path: PathBuf,
    pub y_test_path: PathBuf,
}

impl TrainerArtifacts {
    pub fn new(
        trained_model_path: impl Into<PathBuf>,
        x_test_path: impl Into<PathBuf>,
        y_test_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            trained_model_path: trained_model_path.into(),
            x_test_path: x_test_path.into(),
            y_test_path: y_test_path.into(),
        }
    }
}
