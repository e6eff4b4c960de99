//! Protein sequence → embedding vector store.
use crate::coding::{truncate_sequence, MAX_PROTEIN_LEN};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Serializes as a plain JSON object `{sequence: [f32, ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingStore {
    entries: HashMap<String, Vec<f32>>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let raw = serde_json::to_string(&self.entries)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Exact lookup, falling back to the sequence truncated to
    /// [`MAX_PROTEIN_LEN`] residues (the key used when embeddings are computed).
    pub fn get(&self, sequence: &str) -> Option<&[f32]> {
        self.entries
            .get(sequence)
            .or_else(|| self.entries.get(truncate_sequence(sequence, MAX_PROTEIN_LEN)))
            .map(Vec::as_slice)
    }

    pub fn insert(&mut self, sequence: impl Into<String>, embedding: Vec<f32>) -> Option<Vec<f32>> {
        self.entries.insert(sequence.into(), embedding)
    }

    pub fn contains(&self, sequence: &str) -> bool {
        self.get(sequence).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries
            .iter()
            .map(|(seq, emb)| (seq.as_str(), emb.as_slice()))
    }
}

impl FromIterator<(String, Vec<f32>)> for EmbeddingStore {
    fn from_iter<T: IntoIterator<Item = (String, Vec<f32>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
