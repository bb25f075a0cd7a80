use std::marker::PhantomData;

use candle_core::Device;
use tracing::info;

use crate::core::error::WithContext;
use crate::core::{
    binarize, EvaluationResult, HateSpeechError, PipelineConfig, PipelineError, Result,
    TrainerArtifacts,
};
use crate::loaders::{load_test_split, TokenizerLoader};
use crate::metrics::ConfusionMatrix;
use crate::models::{HateSpeechModel, ModelScore};
use crate::sequences::pad_sequences;

/// Everything measured while evaluating a trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub loss: f64,
    /// Test accuracy in percent.
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
}

/// Scores a freshly trained model on the held-out test split and decides
/// whether it is good enough to deploy.
pub struct ModelEvaluationPipeline<M: HateSpeechModel> {
    pub(crate) config: PipelineConfig,
    pub(crate) artifacts: TrainerArtifacts,
    pub(crate) device: Device,
    pub(crate) _model: PhantomData<M>,
}

impl<M: HateSpeechModel> ModelEvaluationPipeline<M> {
    /// Loads the test split, tokenizer and model, and scores the model.
    pub fn evaluate(&self) -> Result<EvaluationReport, PipelineError> {
        info!("Entering the evaluate function of ModelEvaluationPipeline");
        self.run_evaluation()
            .context("ModelEvaluationPipeline::evaluate")
    }

    /// Evaluates the model and accepts it when its accuracy reaches the
    /// configured threshold.
    pub fn initiate_model_evaluation(&self) -> Result<EvaluationResult, PipelineError> {
        let (_, result) = self.evaluate_and_decide()?;
        Ok(result)
    }

    /// [`initiate_model_evaluation`](Self::initiate_model_evaluation), also
    /// returning the report the decision was based on.
    pub fn evaluate_and_decide(
        &self,
    ) -> Result<(EvaluationReport, EvaluationResult), PipelineError> {
        info!("Initiating model evaluation");
        let report = self.evaluate()?;

        let result =
            EvaluationResult::from_accuracy(report.accuracy, self.config.acceptance_threshold);
        if result.is_model_accepted {
            info!("Trained model is accepted with accuracy: {:.2}%", report.accuracy);
        } else {
            info!("Trained model is rejected with accuracy: {:.2}%", report.accuracy);
        }
        info!("Returning EvaluationResult");
        Ok((report, result))
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    fn run_evaluation(&self) -> Result<EvaluationReport> {
        let split = load_test_split(
            &self.artifacts.x_test_path,
            &self.artifacts.y_test_path,
            &self.config.text_column,
        )?;
        if split.is_empty() {
            return Err(HateSpeechError::Shape("test split has no rows".into()));
        }

        let tokenizer = TokenizerLoader::from_config(&self.config).load()?;
        let model = M::load(&self.artifacts.trained_model_path, &self.device)?;

        let sequences = tokenizer.texts_to_sequences(&split.texts)?;
        let batch = pad_sequences(&sequences, self.config.max_len);

        let probabilities = model.predict_batched(&batch, self.config.batch_size)?;
        if probabilities.len() != split.len() {
            return Err(HateSpeechError::Shape(format!(
                "model returned {} probabilities for {} rows",
                probabilities.len(),
                split.len()
            )));
        }
        let score = ModelScore::from_probabilities(
            &probabilities,
            &split.labels,
            self.config.label_threshold,
        )?;
        let accuracy = score.accuracy * 100.0;
        info!("Test accuracy: {accuracy:.2}%");

        let predicted: Vec<u8> = probabilities
            .iter()
            .map(|p| binarize(*p, self.config.label_threshold))
            .collect();
        let confusion_matrix = ConfusionMatrix::from_labels(&split.labels, &predicted)?;
        info!("Confusion matrix: \n{confusion_matrix}");

        Ok(EvaluationReport {
            loss: score.loss,
            accuracy,
            confusion_matrix,
        })
    }
}
