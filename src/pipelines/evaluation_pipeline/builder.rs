use std::marker::PhantomData;
use std::path::PathBuf;

use super::pipeline::ModelEvaluationPipeline;
use crate::core::error::WithContext;
use crate::core::{HateSpeechError, PipelineConfig, PipelineError, TrainerArtifacts};
use crate::models::{HateSpeechModel, LstmClassifier};
use crate::pipelines::utils::{DeviceRequest, DeviceSelectable};

pub struct ModelEvaluationPipelineBuilder<M: HateSpeechModel> {
    artifacts: TrainerArtifacts,
    config: PipelineConfig,
    device_request: DeviceRequest,
    _model: PhantomData<M>,
}

impl<M: HateSpeechModel> ModelEvaluationPipelineBuilder<M> {
    pub fn new(artifacts: TrainerArtifacts) -> Self {
        Self {
            artifacts,
            config: PipelineConfig::default(),
            device_request: DeviceRequest::Default,
            _model: PhantomData,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.config.max_len = max_len;
        self
    }

    /// Rows scored per forward pass.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn tokenizer_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.tokenizer_path = path.into();
        self
    }

    pub fn build(self) -> Result<ModelEvaluationPipeline<M>, PipelineError> {
        self.config
            .validate()
            .context("ModelEvaluationPipelineBuilder::build")?;
        let device = self
            .device_request
            .resolve()
            .map_err(HateSpeechError::from)
            .context("ModelEvaluationPipelineBuilder::build")?;
        Ok(ModelEvaluationPipeline {
            config: self.config,
            artifacts: self.artifacts,
            device,
            _model: PhantomData,
        })
    }
}

impl<M: HateSpeechModel> DeviceSelectable for ModelEvaluationPipelineBuilder<M> {
    fn device_request_mut(&mut self) -> &mut DeviceRequest {
        &mut self.device_request
    }
}

impl ModelEvaluationPipelineBuilder<LstmClassifier> {
    pub fn lstm(artifacts: TrainerArtifacts) -> Self {
        Self::new(artifacts)
    }
}
