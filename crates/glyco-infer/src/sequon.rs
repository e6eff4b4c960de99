//! N-glycosylation likelihood of sequons with NSequonPred-type classifiers.
//!
//! A sequon is described by a 41-residue window: 20 residues on each side of the
//! asparagine, with `z` standing in for positions beyond the protein's ends.
use crate::embeddings::EmbeddingStore;
use crate::error::{GlycoError, Result};
use candle_core::{DType, Device, Module, Tensor};
use polars::prelude::*;
use tracing::debug;

pub const SEQUON_FLANK: usize = 20;
pub const SEQUON_WINDOW_LEN: usize = 2 * SEQUON_FLANK + 1;
pub const WINDOW_PAD: char = 'z';
pub const DEFAULT_SEQUON_BATCH_SIZE: usize = 32;

/// 0-based positions of every N-X-S/T motif (X ≠ P).
pub fn find_sequons(protein: &str) -> Vec<usize> {
    let residues: Vec<char> = protein.chars().collect();
    residues
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] == 'N' && w[1] != 'P' && matches!(w[2], 'S' | 'T'))
        .map(|(idx, _)| idx)
        .collect()
}

/// The 41-residue window centred on the asparagine at `position`.
pub fn sequon_window(protein: &str, position: usize) -> Result<String> {
    let residues: Vec<char> = protein.chars().collect();
    if residues.get(position) != Some(&'N') {
        return Err(GlycoError::InvalidSequonPosition {
            position,
            len: residues.len(),
        });
    }
    let window = (0..SEQUON_WINDOW_LEN)
        .map(|offset| {
            (position + offset)
                .checked_sub(SEQUON_FLANK)
                .and_then(|idx| residues.get(idx))
                .copied()
                .unwrap_or(WINDOW_PAD)
        })
        .collect();
    Ok(window)
}

/// `(position, window)` for every sequon in `protein`.
pub fn sequon_windows(protein: &str) -> Vec<(usize, String)> {
    find_sequons(protein)
        .into_iter()
        .filter_map(|pos| sequon_window(protein, pos).ok().map(|w| (pos, w)))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequonPrediction {
    pub seq: String,
    /// Probability that the sequon is glycosylated.
    pub glycosylated: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequonPredictions {
    pub rows: Vec<SequonPrediction>,
}

impl SequonPredictions {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequonPrediction> {
        self.rows.iter()
    }

    /// `seq` and `glycosylated` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let (seqs, probs): (Vec<&str>, Vec<f32>) = self
            .rows
            .iter()
            .map(|row| (row.seq.as_str(), row.glycosylated))
            .unzip();
        Ok(df!("seq" => seqs, "glycosylated" => probs)?)
    }
}

/// Glycosylation probability of each window, in input order.
///
/// Every window needs an entry in `embeddings`; the model's raw output is passed
/// through the logistic function.
pub fn get_nsequon_preds<M>(
    windows: &[String],
    model: &M,
    embeddings: &EmbeddingStore,
    batch_size: usize,
    device: &Device,
) -> Result<SequonPredictions>
where
    M: Module + ?Sized,
{
    if batch_size == 0 {
        return Err(GlycoError::InvalidBatchSize);
    }
    let reps = windows
        .iter()
        .map(|window| {
            embeddings
                .get(window)
                .ok_or_else(|| GlycoError::MissingEmbedding(window.clone()))
        })
        .collect::<Result<Vec<_>>>()?;
    let width = reps.first().map_or(0, |rep| rep.len());

    let mut probs = Vec::with_capacity(windows.len());
    for (chunk_idx, chunk) in reps.chunks(batch_size).enumerate() {
        let mut flat = Vec::with_capacity(chunk.len() * width);
        for (offset, rep) in chunk.iter().enumerate() {
            if rep.len() != width {
                return Err(GlycoError::EmbeddingDimMismatch {
                    sequence: windows[chunk_idx * batch_size + offset].clone(),
                    expected: width,
                    got: rep.len(),
                });
            }
            flat.extend_from_slice(rep);
        }
        let x = Tensor::from_vec(flat, (chunk.len(), width), device)?;
        let pred = candle_nn::ops::sigmoid(&model.forward(&x)?)?;
        let pred = pred
            .detach()
            .to_device(&Device::Cpu)?
            .to_dtype(DType::F32)?
            .flatten_all()?
            .to_vec1::<f32>()?;
        if pred.len() != chunk.len() {
            return Err(GlycoError::RowCountMismatch {
                expected: chunk.len(),
                got: pred.len(),
            });
        }
        debug!(batch = chunk_idx, rows = chunk.len(), "sequon model forward");
        probs.extend(pred);
    }

    Ok(SequonPredictions {
        rows: windows
            .iter()
            .zip(probs)
            .map(|(seq, glycosylated)| SequonPrediction {
                seq: seq.clone(),
                glycosylated,
            })
            .collect(),
    })
}
