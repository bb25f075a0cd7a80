pub mod evaluation_pipeline;
pub mod prediction_pipeline;
pub mod utils;

pub use evaluation_pipeline::{
    EvaluationReport, ModelEvaluationPipeline, ModelEvaluationPipelineBuilder,
};
pub use prediction_pipeline::{PredictionPipeline, PredictionPipelineBuilder};
pub use utils::{DeviceRequest, DeviceSelectable};
