//! Command line entry point: evaluate a trained model or label a single text.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hate_speech::pipelines::{
    DeviceSelectable, ModelEvaluationPipelineBuilder, PredictionPipelineBuilder,
};
use hate_speech::{LstmClassifier, PipelineConfig, TrainerArtifacts};

#[derive(Parser)]
#[command(name = "hate-speech", version, about = "Hate speech classification pipelines")]
struct Cli {
    /// JSON file overriding the default pipeline settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tokenizer file (defaults to tokenizer.json)
    #[arg(long, global = true)]
    tokenizer: Option<PathBuf>,

    /// Run on CPU even when CUDA is available
    #[arg(long, global = true)]
    cpu: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score a trained model on the held-out test split and decide acceptance
    Evaluate {
        #[arg(long)]
        model: PathBuf,
        #[arg(long)]
        x_test: PathBuf,
        #[arg(long)]
        y_test: PathBuf,
    },
    /// Label a single text
    Predict {
        text: String,
        /// Model file (defaults to artifacts/PredictModel/<model_name>)
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(tokenizer) = &cli.tokenizer {
        config.tokenizer_path = tokenizer.clone();
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Evaluate {
            model,
            x_test,
            y_test,
        } => {
            let artifacts = TrainerArtifacts::new(model, x_test, y_test);
            let mut builder = ModelEvaluationPipelineBuilder::lstm(artifacts).config(config);
            if cli.cpu {
                builder = builder.cpu();
            }
            let pipeline = builder.build()?;

            let (report, result) = pipeline.evaluate_and_decide()?;
            println!("Test loss: {:.4}", report.loss);
            println!("Test accuracy: {:.2}%", report.accuracy);
            println!("Confusion matrix:\n{}", report.confusion_matrix);
            println!("Model accepted: {}", result.is_model_accepted);
        }
        Command::Predict { text, model } => {
            let mut builder = PredictionPipelineBuilder::<LstmClassifier>::new(config);
            if let Some(model) = model {
                builder = builder.model_path(model);
            }
            if cli.cpu {
                builder = builder.cpu();
            }
            let pipeline = builder.build()?;
            println!("{}", pipeline.run_pipeline(&text)?);
        }
    }

    Ok(())
}
