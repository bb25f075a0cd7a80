use std::marker::PhantomData;
use std::path::PathBuf;

use super::pipeline::PredictionPipeline;
use crate::cleaning::TextCleaner;
use crate::core::error::WithContext;
use crate::core::{HateSpeechError, PipelineConfig, PipelineError};
use crate::loaders::{HfLoader, ModelSource};
use crate::models::{HateSpeechModel, LstmClassifier};
use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};

pub struct PredictionPipelineBuilder<M: HateSpeechModel> {
    config: PipelineConfig,
    model_source: Option<ModelSource>,
    cleaner: TextCleaner,
    device_request: DeviceRequest,
    _model: PhantomData<M>,
}

impl<M: HateSpeechModel> PredictionPipelineBuilder<M> {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            model_source: None,
            cleaner: TextCleaner::default(),
            device_request: DeviceRequest::Default,
            _model: PhantomData,
        }
    }

    /// Reads the model from `path` instead of the configured location.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_source = Some(ModelSource::Local(path.into()));
        self
    }

    /// Downloads `filename` from a Hugging Face Hub repository.
    pub fn hub_model(mut self, repo: &str, filename: &str) -> Self {
        self.model_source = Some(ModelSource::Hub(HfLoader::new(repo, filename)));
        self
    }

    pub fn tokenizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tokenizer_path = path.into();
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.config.max_len = max_len;
        self
    }

    pub fn cleaner(mut self, cleaner: TextCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn build(self) -> Result<PredictionPipeline<M>, PipelineError> {
        self.config
            .validate()
            .context("PredictionPipelineBuilder::build")?;
        let device = self
            .device_request
            .resolve()
            .map_err(HateSpeechError::from)
            .context("PredictionPipelineBuilder::build")?;
        let model_source = self
            .model_source
            .unwrap_or_else(|| ModelSource::from_config(&self.config));
        Ok(PredictionPipeline {
            config: self.config,
            model_source,
            cleaner: self.cleaner,
            device,
            _model: PhantomData,
        })
    }
}

impl<M: HateSpeechModel> DeviceSelectable for PredictionPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl PredictionPipelineBuilder<LstmClassifier> {
    pub fn lstm() -> Self {
        Self::new(PipelineConfig::default())
    }
}
