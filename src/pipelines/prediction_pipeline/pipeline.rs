use std::marker::PhantomData;

use candle_core::Device;
use tracing::info;

use crate::cleaning::TextCleaner;
use crate::core::error::WithContext;
use crate::core::{HateSpeechError, PipelineConfig, PipelineError, PredictionResult, Result};
use crate::loaders::{ModelSource, TokenizerLoader};
use crate::models::HateSpeechModel;
use crate::sequences::pad_sequences;

/// Labels single texts with the deployed classifier.
///
/// Model and tokenizer are loaded on every call; nothing is kept between
/// predictions.
pub struct PredictionPipeline<M: HateSpeechModel> {
    pub(crate) config: PipelineConfig,
    pub(crate) model_source: ModelSource,
    pub(crate) cleaner: TextCleaner,
    pub(crate) device: Device,
    pub(crate) _model: PhantomData<M>,
}

impl<M: HateSpeechModel> PredictionPipeline<M> {
    pub fn predict(&self, text: &str) -> Result<PredictionResult, PipelineError> {
        info!("Running the predict function");
        self.run_prediction(text)
            .context("PredictionPipeline::predict")
    }

    pub fn run_pipeline(&self, text: &str) -> Result<PredictionResult, PipelineError> {
        info!("Entered the run_pipeline method of PredictionPipeline");
        let prediction = self.predict(text)?;
        info!("Exited the run_pipeline method of PredictionPipeline");
        Ok(prediction)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn model_source(&self) -> &ModelSource {
        &self.model_source
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn run_prediction(&self, text: &str) -> Result<PredictionResult> {
        let model_path = self.model_source.resolve()?;
        let model = M::load(&model_path, &self.device)?;
        let tokenizer = TokenizerLoader::from_config(&self.config).load()?;

        let cleaned = self.cleaner.clean(text);
        let sequences = tokenizer.texts_to_sequences(&[cleaned])?;
        let batch = pad_sequences(&sequences, self.config.max_len);

        let probability = match model.predict(&batch)?.as_slice() {
            [p] => *p,
            other => {
                return Err(HateSpeechError::Shape(format!(
                    "expected one probability for one text, got {}",
                    other.len()
                )))
            }
        };
        info!(probability, "Prediction probability");

        let label = PredictionResult::from_probability(probability, self.config.label_threshold);
        info!("Prediction: {label}");
        Ok(label)
    }
}
