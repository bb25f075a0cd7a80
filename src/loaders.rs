//! Locating and loading persisted artifacts.
//!
//! - [`HfLoader`] - fetches a single file from a Hugging Face Hub repository
//! - [`ModelSource`] - where the prediction model lives (local path or Hub)
//! - [`TokenizerLoader`] - loads the word-level tokenizer used at training time
//! - [`load_test_split`] - reads the held-out test features and labels
//!
//! Every loader fails immediately; nothing is retried.

use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api as HfApi;

use crate::core::{HateSpeechError, PipelineConfig, Result};
use crate::sequences::SequenceTokenizer;

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = HfApi::new()?;
        let hf_repo = hf_api.model(self.repo.clone());
        tracing::info!(repo = %self.repo, file = %self.filename, "fetching model from hub");
        Ok(hf_repo.get(self.filename.as_str())?)
    }
}

#[derive(Debug, Clone)]
pub enum ModelSource {
    Local(PathBuf),
    Hub(HfLoader),
}

impl ModelSource {
    /// Prediction model location described by `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        match &config.model_repo {
            Some(repo) => Self::Hub(HfLoader::new(repo, &config.model_name)),
            None => Self::Local(config.predict_model_path()),
        }
    }

    /// Path of the model file on disk. A local file that does not exist is
    /// reported as [`HateSpeechError::ModelNotFound`].
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            Self::Local(path) => {
                if path.is_file() {
                    Ok(path.clone())
                } else {
                    Err(HateSpeechError::ModelNotFound(path.clone()))
                }
            }
            Self::Hub(loader) => loader.load(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenizerLoader {
    pub path: PathBuf,
    pub unknown_token: Option<String>,
}

impl TokenizerLoader {
    pub fn new(path: impl Into<PathBuf>, unknown_token: Option<String>) -> Self {
        Self {
            path: path.into(),
            unknown_token,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.tokenizer_path, config.unknown_token.clone())
    }

    pub fn load(&self) -> Result<SequenceTokenizer> {
        let tokenizer = SequenceTokenizer::from_file(&self.path, self.unknown_token.as_deref())?;
        tracing::debug!(
            path = %self.path.display(),
            vocab_size = tokenizer.vocab_size(),
            "loaded tokenizer"
        );
        Ok(tokenizer)
    }
}

/// Held-out texts and their labels, aligned by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSplit {
    pub texts: Vec<String>,
    pub labels: Vec<u8>,
}

impl TestSplit {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn csv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    let file = std::fs::File::open(path).map_err(|e| HateSpeechError::io(path, e))?;
    Ok(csv::ReaderBuilder::new().has_headers(true).from_reader(file))
}

fn csv_error(path: &Path) -> impl Fn(csv::Error) -> HateSpeechError + '_ {
    move |source| HateSpeechError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

/// Cell value an empty text is read as, matching how training stringified
/// missing values.
pub const MISSING_TEXT: &str = "nan";

/// Reads the text column of the feature file. Empty cells read as
/// [`MISSING_TEXT`].
pub fn read_texts(path: &Path, text_column: &str) -> Result<Vec<String>> {
    let mut reader = csv_reader(path)?;
    let column = reader
        .headers()
        .map_err(csv_error(path))?
        .iter()
        .position(|header| header == text_column)
        .ok_or_else(|| {
            HateSpeechError::Shape(format!(
                "{} has no `{text_column}` column",
                path.display()
            ))
        })?;

    reader
        .records()
        .map(|record| {
            let record = record.map_err(csv_error(path))?;
            let text = record.get(column).unwrap_or_default();
            Ok(if text.is_empty() { MISSING_TEXT } else { text }.to_string())
        })
        .collect()
}

/// Reads the label column of the label file: the last column, after the
/// leading index column when there is one.
pub fn read_labels(path: &Path) -> Result<Vec<u8>> {
    let mut reader = csv_reader(path)?;
    let columns = reader.headers().map_err(csv_error(path))?.len();
    if columns == 0 || columns > 2 {
        return Err(HateSpeechError::Shape(format!(
            "{} should hold an index and one label column, found {columns} columns",
            path.display()
        )));
    }

    reader
        .records()
        .enumerate()
        .map(|(row, record)| {
            let record = record.map_err(csv_error(path))?;
            let value = record.get(columns - 1).unwrap_or_default().trim();
            parse_label(value).ok_or_else(|| {
                HateSpeechError::Shape(format!(
                    "{} row {row}: `{value}` is not a binary label",
                    path.display()
                ))
            })
        })
        .collect()
}

fn parse_label(value: &str) -> Option<u8> {
    match value.parse::<f64>().ok()? {
        v if v == 0.0 => Some(0),
        v if v == 1.0 => Some(1),
        _ => None,
    }
}

pub fn load_test_split(x_path: &Path, y_path: &Path, text_column: &str) -> Result<TestSplit> {
    let texts = read_texts(x_path, text_column)?;
    let labels = read_labels(y_path)?;
    if texts.len() != labels.len() {
        return Err(HateSpeechError::Shape(format!(
            "{} test texts but {} labels",
            texts.len(),
            labels.len()
        )));
    }
    Ok(TestSplit { texts, labels })
}
