#![allow(dead_code)]

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};

use hate_speech::core::{HateSpeechError, Result};
use hate_speech::sequences::PaddedBatch;
use hate_speech::HateSpeechModel;

pub const VOCAB: &[&str] = &["[UNK]", "hate", "hell", "go", "back", "nice", "day", "people"];

/// Writes a word-level `tokenizer.json` over [`VOCAB`].
pub fn write_tokenizer(dir: &Path) -> anyhow::Result<PathBuf> {
    write_tokenizer_with(dir, VOCAB)
}

/// Writes a word-level `tokenizer.json` where `vocab[i]` has id `i`.
pub fn write_tokenizer_with(dir: &Path, vocab: &[&str]) -> anyhow::Result<PathBuf> {
    let vocab: serde_json::Map<String, serde_json::Value> = vocab
        .iter()
        .enumerate()
        .map(|(id, word)| (word.to_string(), serde_json::json!(id)))
        .collect();
    let tokenizer = serde_json::json!({
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": { "type": "Lowercase" },
        "pre_tokenizer": { "type": "Whitespace" },
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": vocab,
            "unk_token": "[UNK]"
        }
    });
    let path = dir.join("tokenizer.json");
    std::fs::write(&path, serde_json::to_string(&tokenizer)?)?;
    Ok(path)
}

pub fn id_of(word: &str) -> u32 {
    VOCAB.iter().position(|w| *w == word).expect("word in vocab") as u32
}

/// Writes `x_test.csv` and `y_test.csv` in the layout produced by training.
pub fn write_split(dir: &Path, texts: &[&str], labels: &[u8]) -> anyhow::Result<(PathBuf, PathBuf)> {
    let x_path = dir.join("x_test.csv");
    let mut x = csv::Writer::from_path(&x_path)?;
    x.write_record(["", "tweet"])?;
    for (i, text) in texts.iter().enumerate() {
        x.write_record([i.to_string().as_str(), *text])?;
    }
    x.flush()?;

    let y_path = dir.join("y_test.csv");
    let mut y = csv::Writer::from_path(&y_path)?;
    y.write_record(["", "label"])?;
    for (i, label) in labels.iter().enumerate() {
        y.write_record([i.to_string(), label.to_string()])?;
    }
    y.flush()?;

    Ok((x_path, y_path))
}

thread_local! {
    static STUB_LOADS: Cell<usize> = const { Cell::new(0) };
}

/// Number of times [`StubModel::load`] ran on this thread.
pub fn stub_loads() -> usize {
    STUB_LOADS.with(Cell::get)
}

/// Outputs of a [`StubModel`], stored as JSON in place of real weights.
///
/// With `probabilities` set, the rows seen by successive `predict` calls get
/// consecutive entries, so a batch split into chunks still lines up.
/// With `trigger` set, rows containing that token id get 0.9 and others 0.1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubSpec {
    #[serde(default)]
    pub probabilities: Vec<f32>,
    #[serde(default)]
    pub trigger: Option<u32>,
}

impl StubSpec {
    pub fn fixed(probabilities: &[f32]) -> Self {
        Self {
            probabilities: probabilities.to_vec(),
            trigger: None,
        }
    }

    pub fn triggered_by(id: u32) -> Self {
        Self {
            probabilities: Vec::new(),
            trigger: Some(id),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        std::fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

pub struct StubModel {
    spec: StubSpec,
    cursor: Cell<usize>,
}

impl HateSpeechModel for StubModel {
    fn load(path: &Path, _device: &Device) -> Result<Self> {
        STUB_LOADS.with(|loads| loads.set(loads.get() + 1));
        let content = std::fs::read_to_string(path).map_err(|e| HateSpeechError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let spec = serde_json::from_str(&content).map_err(|e| HateSpeechError::Deserialization {
            what: "stub model",
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(Self {
            spec,
            cursor: Cell::new(0),
        })
    }

    fn predict(&self, batch: &PaddedBatch) -> Result<Vec<f32>> {
        if let Some(trigger) = self.spec.trigger {
            return Ok((0..batch.rows())
                .map(|row| if batch.row(row).contains(&trigger) { 0.9 } else { 0.1 })
                .collect());
        }
        let start = self.cursor.get();
        let end = start + batch.rows();
        let probabilities = self.spec.probabilities.get(start..end).ok_or_else(|| {
            HateSpeechError::Shape(format!(
                "stub holds {} probabilities, asked for rows {start}..{end}",
                self.spec.probabilities.len()
            ))
        })?;
        self.cursor.set(end);
        Ok(probabilities.to_vec())
    }
}

/// Saves LSTM classifier weights whose recurrent part is all zeros, so every
/// text is scored `sigmoid(dense_bias)`.
pub fn write_lstm_weights(path: &Path, dense_bias: f32) -> anyhow::Result<()> {
    let dev = Device::Cpu;
    let (vocab, embed, hidden) = (VOCAB.len(), 4, 3);
    let mut tensors = HashMap::new();
    tensors.insert(
        "embedding.weight",
        Tensor::ones((vocab, embed), DType::F32, &dev)?,
    );
    tensors.insert(
        "lstm.weight_ih_l0",
        Tensor::zeros((4 * hidden, embed), DType::F32, &dev)?,
    );
    tensors.insert(
        "lstm.weight_hh_l0",
        Tensor::zeros((4 * hidden, hidden), DType::F32, &dev)?,
    );
    tensors.insert("lstm.bias_ih_l0", Tensor::zeros(4 * hidden, DType::F32, &dev)?);
    tensors.insert("lstm.bias_hh_l0", Tensor::zeros(4 * hidden, DType::F32, &dev)?);
    tensors.insert(
        "dense.weight",
        Tensor::ones((1, hidden), DType::F32, &dev)?,
    );
    tensors.insert("dense.bias", Tensor::new(&[dense_bias], &dev)?);
    candle_core::safetensors::save(&tensors, path)?;
    Ok(())
}
