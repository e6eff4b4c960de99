//! ESM-1b alphabet and batch converter.
use crate::error::Result;
use candle_core::{Device, Tensor};
use std::collections::HashMap;

/// Token order of the ESM-1b vocabulary.
pub const ESM1B_VOCAB: [&str; 33] = [
    "<cls>", "<pad>", "<eos>", "<unk>", "L", "A", "G", "V", "S", "E", "R", "T", "I", "D", "P", "K",
    "Q", "N", "F", "Y", "M", "H", "W", "C", "X", "B", "U", "Z", "O", ".", "-", "<null_1>", "<mask>",
];

#[derive(Debug, Clone)]
pub struct EsmAlphabet {
    tok_to_idx: HashMap<char, u32>,
    cls_token_id: u32,
    pad_token_id: u32,
    eos_token_id: u32,
    unk_token_id: u32,
}

impl EsmAlphabet {
    pub fn esm1b() -> Self {
        let tok_to_idx = ESM1B_VOCAB
            .iter()
            .enumerate()
            .filter(|(_, tok)| tok.len() == 1)
            .filter_map(|(idx, tok)| tok.chars().next().map(|c| (c, idx as u32)))
            .collect();
        Self {
            tok_to_idx,
            cls_token_id: 0,
            pad_token_id: 1,
            eos_token_id: 2,
            unk_token_id: 3,
        }
    }

    pub fn vocab_size(&self) -> usize {
        ESM1B_VOCAB.len()
    }

    pub fn cls_token_id(&self) -> u32 {
        self.cls_token_id
    }

    pub fn pad_token_id(&self) -> u32 {
        self.pad_token_id
    }

    pub fn eos_token_id(&self) -> u32 {
        self.eos_token_id
    }

    pub fn unk_token_id(&self) -> u32 {
        self.unk_token_id
    }

    pub fn token_id(&self, residue: char) -> u32 {
        self.tok_to_idx
            .get(&residue)
            .copied()
            .unwrap_or(self.unk_token_id)
    }

    /// `<cls> residues <eos>` for one sequence.
    pub fn encode(&self, sequence: &str) -> Vec<u32> {
        let mut tokens = Vec::with_capacity(sequence.len() + 2);
        tokens.push(self.cls_token_id);
        tokens.extend(sequence.chars().map(|c| self.token_id(c)));
        tokens.push(self.eos_token_id);
        tokens
    }

    /// Encodes and right-pads a batch into a `u32 [batch, longest + 2]` tensor.
    pub fn batch_convert(&self, sequences: &[&str], device: &Device) -> Result<Tensor> {
        let encoded: Vec<Vec<u32>> = sequences.iter().map(|seq| self.encode(seq)).collect();
        let width = encoded.iter().map(Vec::len).max().unwrap_or(2);
        let mut flat = Vec::with_capacity(encoded.len() * width);
        for tokens in &encoded {
            flat.extend_from_slice(tokens);
            flat.extend(std::iter::repeat(self.pad_token_id).take(width - tokens.len()));
        }
        Ok(Tensor::from_vec(flat, (encoded.len(), width), device)?)
    }
}

impl Default for EsmAlphabet {
    fn default() -> Self {
        Self::esm1b()
    }
}
