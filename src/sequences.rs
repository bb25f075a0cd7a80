//! Conversion of text into fixed-length integer sequences.
//!
//! [`SequenceTokenizer`] wraps a word-level [`tokenizers::Tokenizer`] and
//! produces one id sequence per text. [`pad_sequences`] then brings every
//! sequence to the same length so the batch can be fed to a model as a
//! single `[rows, max_len]` tensor.

use std::path::Path;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

use crate::core::{HateSpeechError, Result};

/// Id used to fill the front of sequences shorter than `max_len`.
pub const PAD_ID: u32 = 0;
/// Vocabulary entry that may own [`PAD_ID`] besides the unknown token.
pub const PAD_TOKEN: &str = "[PAD]";

#[derive(Debug)]
pub struct SequenceTokenizer {
    tokenizer: Tokenizer,
    unknown_id: Option<u32>,
}

impl SequenceTokenizer {
    /// Wraps `tokenizer`. When `unknown_token` is in the vocabulary, its id is
    /// removed from every encoded sequence.
    ///
    /// [`PAD_ID`] is reserved for padding: the vocabulary may leave it unused
    /// or give it to [`PAD_TOKEN`] or `unknown_token`, but never to a word.
    pub fn new(tokenizer: Tokenizer, unknown_token: Option<&str>) -> Result<Self> {
        if let Some(token) = tokenizer.id_to_token(PAD_ID) {
            if token != PAD_TOKEN && Some(token.as_str()) != unknown_token {
                return Err(HateSpeechError::Tokenization(format!(
                    "id {PAD_ID} is reserved for padding but the vocabulary maps it to `{token}`"
                )));
            }
        }
        let unknown_id = unknown_token.and_then(|token| tokenizer.token_to_id(token));
        Ok(Self {
            tokenizer,
            unknown_id,
        })
    }

    pub fn from_file(path: impl AsRef<Path>, unknown_token: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HateSpeechError::io(
                path,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }
        let tokenizer = Tokenizer::from_file(path)
            .map_err(|e| HateSpeechError::deserialization("tokenizer", path, e))?;
        Self::new(tokenizer, unknown_token)
    }

    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    pub fn texts_to_sequences<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Vec<u32>>> {
        texts
            .iter()
            .map(|text| {
                let encoding = self
                    .tokenizer
                    .encode(text.as_ref(), false)
                    .map_err(|e| HateSpeechError::Tokenization(e.to_string()))?;
                Ok(encoding
                    .get_ids()
                    .iter()
                    .copied()
                    .filter(|id| Some(*id) != self.unknown_id)
                    .collect())
            })
            .collect()
    }

    /// Inverse of [`texts_to_sequences`](Self::texts_to_sequences). Padding
    /// ids are skipped.
    pub fn sequences_to_texts(&self, sequences: &[Vec<u32>]) -> Result<Vec<String>> {
        sequences
            .iter()
            .map(|ids| {
                let ids: Vec<u32> = ids.iter().copied().filter(|id| *id != PAD_ID).collect();
                self.tokenizer
                    .decode(&ids, true)
                    .map_err(|e| HateSpeechError::Tokenization(e.to_string()))
            })
            .collect()
    }
}

/// Pads each sequence at the front with [`PAD_ID`] and truncates long ones
/// from the front, keeping their last `max_len` ids.
pub fn pad_sequences(sequences: &[Vec<u32>], max_len: usize) -> PaddedBatch {
    let mut ids = Vec::with_capacity(sequences.len() * max_len);
    for sequence in sequences {
        if sequence.len() >= max_len {
            ids.extend_from_slice(&sequence[sequence.len() - max_len..]);
        } else {
            ids.extend(std::iter::repeat(PAD_ID).take(max_len - sequence.len()));
            ids.extend_from_slice(sequence);
        }
    }
    PaddedBatch {
        ids,
        rows: sequences.len(),
        max_len,
    }
}

/// Row-major matrix of padded id sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    ids: Vec<u32>,
    rows: usize,
    max_len: usize,
}

impl PaddedBatch {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, index: usize) -> &[u32] {
        &self.ids[index * self.max_len..(index + 1) * self.max_len]
    }

    /// Consecutive sub-batches of at most `size` rows, in row order.
    pub fn chunks(&self, size: usize) -> impl Iterator<Item = PaddedBatch> + '_ {
        let size = size.max(1);
        (0..self.rows).step_by(size).map(move |start| {
            let rows = size.min(self.rows - start);
            PaddedBatch {
                ids: self.ids[start * self.max_len..(start + rows) * self.max_len].to_vec(),
                rows,
                max_len: self.max_len,
            }
        })
    }

    /// `[rows, max_len]` tensor of `u32` ids.
    pub fn to_tensor(&self, device: &Device) -> Result<Tensor> {
        Ok(Tensor::from_slice(&self.ids, (self.rows, self.max_len), device)?)
    }
}
