//! Protein embeddings from ESM-1b-type language models.
//!
//! Each sequence is truncated, tokenized with the ESM alphabet, run through the
//! model in a single batch and reduced to one vector by averaging the token
//! representations of one layer (BOS, EOS and padding excluded).
pub mod alphabet;

pub use alphabet::EsmAlphabet;

use crate::coding::{truncate_sequence, MAX_PROTEIN_LEN};
use crate::embeddings::EmbeddingStore;
use crate::error::{GlycoError, Result};
use crate::models::ProteinLanguageModel;
use bon::Builder;
use candle_core::{DType, Device, IndexOp};
use itertools::Itertools;
use tracing::debug;

/// Final layer of the 33-layer ESM-1b model.
pub const ESM1B_REPR_LAYER: usize = 33;

#[derive(Debug, Clone, Builder)]
pub struct EmbeddingConfig {
    #[builder(default = ESM1B_REPR_LAYER)]
    pub repr_layer: usize,
    #[builder(default = MAX_PROTEIN_LEN)]
    pub max_len: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One mean-pooled embedding per unique (truncated) sequence, keyed by the
/// truncated sequence.
pub fn get_esm1b_representations<M>(
    prots: &[String],
    model: &M,
    alphabet: &EsmAlphabet,
    config: &EmbeddingConfig,
    device: &Device,
) -> Result<EmbeddingStore>
where
    M: ProteinLanguageModel + ?Sized,
{
    let sequences: Vec<&str> = prots
        .iter()
        .map(|prot| truncate_sequence(prot, config.max_len))
        .unique()
        .collect();
    if sequences.is_empty() {
        return Ok(EmbeddingStore::new());
    }

    let tokens = alphabet.batch_convert(&sequences, device)?;
    debug!(sequences = sequences.len(), dims = ?tokens.dims(), "protein language model forward");
    let output = model.forward(&tokens, &[config.repr_layer])?;
    let token_representations = output
        .representations
        .get(&config.repr_layer)
        .ok_or(GlycoError::MissingLayer(config.repr_layer))?
        .detach()
        .to_device(&Device::Cpu)?
        .to_dtype(DType::F32)?;

    sequences
        .iter()
        .enumerate()
        .map(|(i, seq)| -> Result<(String, Vec<f32>)> {
            let residues = seq.chars().count();
            let pooled = token_representations
                .i(i)?
                .narrow(0, 1, residues)?
                .mean(0)?
                .to_vec1::<f32>()?;
            Ok((seq.to_string(), pooled))
        })
        .collect()
}
