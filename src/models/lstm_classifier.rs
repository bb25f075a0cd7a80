use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Module, Tensor};
use candle_nn::rnn::{LSTMConfig, LSTM, RNN};
use candle_nn::{Embedding, Linear, VarBuilder};

use super::HateSpeechModel;
use crate::core::{HateSpeechError, Result};
use crate::sequences::PaddedBatch;

/// Dimensions of an [`LstmClassifier`], read off its weight tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LstmClassifierConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
}

impl LstmClassifierConfig {
    pub fn from_tensors(tensors: &HashMap<String, Tensor>) -> Result<Self> {
        let (vocab_size, embedding_dim) = matrix_dims(tensors, "embedding.weight")?;
        let (gates, hidden_dim) = matrix_dims(tensors, "lstm.weight_hh_l0")?;
        if gates != 4 * hidden_dim {
            return Err(HateSpeechError::Shape(format!(
                "lstm.weight_hh_l0 has {gates} rows, expected 4 * {hidden_dim}"
            )));
        }
        Ok(Self {
            vocab_size,
            embedding_dim,
            hidden_dim,
        })
    }
}

fn matrix_dims(tensors: &HashMap<String, Tensor>, name: &str) -> Result<(usize, usize)> {
    let tensor = tensors
        .get(name)
        .ok_or_else(|| HateSpeechError::Shape(format!("missing tensor `{name}`")))?;
    tensor
        .dims2()
        .map_err(|e| HateSpeechError::Shape(format!("`{name}`: {e}")))
}

/// Embedding, a single forward LSTM layer and a sigmoid dense head.
///
/// The last hidden state of the LSTM summarizes the whole sequence.
#[derive(Debug, Clone)]
pub struct LstmClassifier {
    embedding: Embedding,
    lstm: LSTM,
    dense: Linear,
    config: LstmClassifierConfig,
    device: Device,
    span: tracing::Span,
}

impl LstmClassifier {
    pub fn new(config: LstmClassifierConfig, vb: VarBuilder) -> candle_core::Result<Self> {
        let embedding = candle_nn::embedding(
            config.vocab_size,
            config.embedding_dim,
            vb.pp("embedding"),
        )?;
        let lstm = candle_nn::lstm(
            config.embedding_dim,
            config.hidden_dim,
            LSTMConfig::default(),
            vb.pp("lstm"),
        )?;
        let dense = candle_nn::linear(config.hidden_dim, 1, vb.pp("dense"))?;
        Ok(Self {
            embedding,
            lstm,
            dense,
            config,
            device: vb.device().clone(),
            span: tracing::span!(tracing::Level::TRACE, "lstm-classifier"),
        })
    }

    pub fn from_tensors(tensors: HashMap<String, Tensor>, device: &Device) -> Result<Self> {
        let config = LstmClassifierConfig::from_tensors(&tensors)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        Self::new(config, vb).map_err(|e| HateSpeechError::Shape(e.to_string()))
    }

    pub fn config(&self) -> &LstmClassifierConfig {
        &self.config
    }

    /// Maps `[batch, seq_len]` ids to `[batch]` positive-class probabilities.
    ///
    /// Steps through the sequence keeping only the running state.
    pub fn forward(&self, input_ids: &Tensor) -> candle_core::Result<Tensor> {
        let _enter = self.span.enter();
        let (batch, seq_len) = input_ids.dims2()?;
        if seq_len == 0 {
            return Err(candle_core::Error::Msg(
                "cannot classify an empty sequence".into(),
            ));
        }
        let embedded = self.embedding.forward(input_ids)?;
        let mut state = self.lstm.zero_state(batch)?;
        for t in 0..seq_len {
            let input = embedded.narrow(1, t, 1)?.squeeze(1)?.contiguous()?;
            state = self.lstm.step(&input, &state)?;
        }
        let logits = self.dense.forward(state.h())?;
        candle_nn::ops::sigmoid(&logits)?.squeeze(1)
    }
}

impl HateSpeechModel for LstmClassifier {
    fn load(path: &Path, device: &Device) -> Result<Self> {
        if !path.is_file() {
            return Err(HateSpeechError::ModelNotFound(path.to_path_buf()));
        }
        let tensors = candle_core::safetensors::load(path, device)
            .map_err(|e| HateSpeechError::deserialization("model weights", path, e))?;
        let model = Self::from_tensors(tensors, device)?;
        tracing::debug!(config = ?model.config, path = %path.display(), "loaded lstm classifier");
        Ok(model)
    }

    fn predict(&self, batch: &PaddedBatch) -> Result<Vec<f32>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let input_ids = batch.to_tensor(&self.device)?;
        let probabilities = self.forward(&input_ids)?;
        Ok(probabilities.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequences::pad_sequences;

    const VOCAB: usize = 6;
    const EMBED: usize = 3;
    const HIDDEN: usize = 2;

    fn weights(dense_bias: f32, dense_cols: usize) -> candle_core::Result<HashMap<String, Tensor>> {
        let dev = Device::Cpu;
        let mut tensors = HashMap::new();
        tensors.insert(
            "embedding.weight".to_string(),
            Tensor::ones((VOCAB, EMBED), DType::F32, &dev)?,
        );
        tensors.insert(
            "lstm.weight_ih_l0".to_string(),
            Tensor::zeros((4 * HIDDEN, EMBED), DType::F32, &dev)?,
        );
        tensors.insert(
            "lstm.weight_hh_l0".to_string(),
            Tensor::zeros((4 * HIDDEN, HIDDEN), DType::F32, &dev)?,
        );
        tensors.insert(
            "lstm.bias_ih_l0".to_string(),
            Tensor::zeros(4 * HIDDEN, DType::F32, &dev)?,
        );
        tensors.insert(
            "lstm.bias_hh_l0".to_string(),
            Tensor::zeros(4 * HIDDEN, DType::F32, &dev)?,
        );
        tensors.insert(
            "dense.weight".to_string(),
            Tensor::zeros((1, dense_cols), DType::F32, &dev)?,
        );
        tensors.insert(
            "dense.bias".to_string(),
            Tensor::new(&[dense_bias], &dev)?,
        );
        Ok(tensors)
    }

    #[test]
    fn infers_dimensions_from_weights() -> anyhow::Result<()> {
        let config = LstmClassifierConfig::from_tensors(&weights(0.0, HIDDEN)?)?;
        assert_eq!(
            config,
            LstmClassifierConfig {
                vocab_size: VOCAB,
                embedding_dim: EMBED,
                hidden_dim: HIDDEN,
            }
        );
        Ok(())
    }

    // Zero recurrent weights keep the hidden state at zero, so the output is
    // sigmoid(dense bias) for every row.
    #[test]
    fn zero_recurrent_weights_yield_bias_probability() -> anyhow::Result<()> {
        let model = LstmClassifier::from_tensors(weights(2.0, HIDDEN)?, &Device::Cpu)?;
        let batch = pad_sequences(&[vec![1, 2], vec![5, 4, 3, 2, 1]], 4);
        let probabilities = model.predict(&batch)?;

        let expected = 1.0 / (1.0 + (-2.0f32).exp());
        assert_eq!(probabilities.len(), 2);
        for p in probabilities {
            assert!((p - expected).abs() < 1e-5);
        }
        Ok(())
    }

    #[test]
    fn stepped_state_matches_full_sequence_unroll() -> anyhow::Result<()> {
        let dev = Device::Cpu;
        let mut tensors = weights(0.3, HIDDEN)?;
        for (name, shape) in [
            ("embedding.weight", (VOCAB, EMBED)),
            ("lstm.weight_ih_l0", (4 * HIDDEN, EMBED)),
            ("lstm.weight_hh_l0", (4 * HIDDEN, HIDDEN)),
            ("dense.weight", (1, HIDDEN)),
        ] {
            tensors.insert(name.to_string(), Tensor::randn(0f32, 1f32, shape, &dev)?);
        }
        let model = LstmClassifier::from_tensors(tensors, &dev)?;
        let input_ids = pad_sequences(&[vec![1, 2, 3], vec![5, 4, 3, 2, 1], vec![]], 5)
            .to_tensor(&dev)?;

        let embedded = model.embedding.forward(&input_ids)?;
        let states = model.lstm.seq(&embedded)?;
        let last = states.last().expect("non-empty sequence");
        let expected = candle_nn::ops::sigmoid(&model.dense.forward(last.h())?)?
            .squeeze(1)?
            .to_vec1::<f32>()?;

        let actual = model.forward(&input_ids)?.to_vec1::<f32>()?;
        assert_eq!(actual.len(), 3);
        for (a, e) in actual.iter().zip(&expected) {
            assert!((a - e).abs() < 1e-5, "{a} != {e}");
        }
        Ok(())
    }

    #[test]
    fn mismatched_head_is_a_shape_error() -> anyhow::Result<()> {
        let err = LstmClassifier::from_tensors(weights(0.0, HIDDEN + 1)?, &Device::Cpu)
            .unwrap_err();
        assert!(matches!(err, HateSpeechError::Shape(_)));
        Ok(())
    }

    #[test]
    fn missing_tensor_is_a_shape_error() -> anyhow::Result<()> {
        let mut tensors = weights(0.0, HIDDEN)?;
        tensors.remove("embedding.weight");
        let err = LstmClassifierConfig::from_tensors(&tensors).unwrap_err();
        assert!(matches!(err, HateSpeechError::Shape(_)));
        Ok(())
    }

    #[test]
    fn loads_from_safetensors_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.safetensors");
        candle_core::safetensors::save(&weights(-1.0, HIDDEN)?, &path)?;

        let model = LstmClassifier::load(&path, &Device::Cpu)?;
        let probabilities = model.predict(&pad_sequences(&[vec![3]], 2))?;
        assert!(probabilities[0] < 0.5);
        Ok(())
    }

    #[test]
    fn corrupt_file_is_a_deserialization_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, b"not a safetensors file")?;

        let err = LstmClassifier::load(&path, &Device::Cpu).unwrap_err();
        assert!(matches!(err, HateSpeechError::Deserialization { .. }));
        Ok(())
    }
}
