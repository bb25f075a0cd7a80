use std::path::PathBuf;

use thiserror::Error;

/// Every way loading, transforming or running the classifier can fail.
#[derive(Debug, Error)]
pub enum HateSpeechError {
    /// The prediction model is not present at its configured location.
    #[error("model file not found at {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A persisted artifact (tokenizer, weights, config) could not be decoded.
    #[error("failed to deserialize {what} from {}: {message}", path.display())]
    Deserialization {
        what: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("tokenization failed: {0}")]
    Tokenization(String),

    /// Data does not have the rows, columns or dimensions the pipeline expects.
    #[error("shape mismatch: {0}")]
    Shape(String),

    #[error("inference failed: {0}")]
    Inference(#[from] candle_core::Error),

    #[error("model download failed: {0}")]
    Hub(#[from] hf_hub::api::sync::ApiError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HateSpeechError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn deserialization(
        what: &'static str,
        path: impl Into<PathBuf>,
        message: impl ToString,
    ) -> Self {
        Self::Deserialization {
            what,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// The single error returned by public pipeline operations.
///
/// Wraps the underlying [`HateSpeechError`] together with the operation that
/// was running when it occurred.
#[derive(Debug, Error)]
#[error("{context} failed: {source}")]
pub struct PipelineError {
    context: &'static str,
    #[source]
    source: HateSpeechError,
}

impl PipelineError {
    pub fn new(context: &'static str, source: HateSpeechError) -> Self {
        Self { context, source }
    }

    /// Name of the pipeline operation that failed.
    pub fn context(&self) -> &'static str {
        self.context
    }

    pub fn kind(&self) -> &HateSpeechError {
        &self.source
    }

    pub fn into_inner(self) -> HateSpeechError {
        self.source
    }
}

pub type Result<T, E = HateSpeechError> = std::result::Result<T, E>;

/// Attaches an operation name to a [`HateSpeechError`] result.
pub(crate) trait WithContext<T> {
    fn context(self, context: &'static str) -> Result<T, PipelineError>;
}

impl<T> WithContext<T> for Result<T> {
    fn context(self, context: &'static str) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::new(context, e))
    }
}
