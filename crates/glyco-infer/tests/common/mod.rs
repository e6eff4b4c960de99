#![allow(dead_code)]
//! Stub encoders and models shared by the integration tests.
use candle_core::{DType, Result, Tensor, D};
use glyco_infer::{
    GlycanGraph, GlycanGraphEncoder, GlycanGraphModel, GlycoError, GraphDataLoader,
    GraphModelOutput, LectinBindingModel, PlmOutput, ProteinLanguageModel,
};
use std::collections::HashMap;

/// Splits IUPAC-condensed glycans at brackets and chains the pieces:
/// `Gal(b1-4)Glc` → `Gal`, `b1-4`, `Glc`. Tokens outside `libr` are rejected.
pub struct BracketChain;

impl GlycanGraphEncoder for BracketChain {
    fn encode(&self, glycan: &str, libr: &[String]) -> glyco_infer::Result<GlycanGraph> {
        let labels = glycan
            .split(['(', ')'])
            .filter(|token| !token.is_empty())
            .map(|token| {
                libr.iter()
                    .position(|l| l == token)
                    .map(|idx| idx as u32)
                    .ok_or_else(|| GlycoError::Encoding {
                        glycan: glycan.to_string(),
                        message: format!("unknown glycoletter `{token}`"),
                    })
            })
            .collect::<glyco_infer::Result<Vec<u32>>>()?;
        let edges = (1..labels.len() as u32).map(|i| (i - 1, i)).collect();
        Ok(GlycanGraph { labels, edges })
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn libr() -> Vec<String> {
    ["Gal", "Glc", "GlcNAc", "Man", "Neu5Ac", "Fuc", "a1-2", "b1-4", "a2-3"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn loader() -> GraphDataLoader<BracketChain> {
    GraphDataLoader::new(BracketChain, libr())
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Node count of each graph in a batch, from the batch-assignment vector.
fn nodes_per_graph(batch: &Tensor, num_graphs: usize) -> Result<Vec<f32>> {
    let mut counts = vec![0f32; num_graphs];
    for graph in batch.to_vec1::<u32>()? {
        counts[graph as usize] += 1.0;
    }
    Ok(counts)
}

fn num_graphs(batch: &Tensor) -> Result<usize> {
    Ok(batch
        .to_vec1::<u32>()?
        .into_iter()
        .max()
        .map_or(0, |max| max as usize + 1))
}

/// Representation `[node count, label sum]`; logits one-hot at `node count % 3`.
pub struct CountingGraphModel;

impl GlycanGraphModel for CountingGraphModel {
    fn forward_inference(
        &self,
        labels: &Tensor,
        _edge_index: &Tensor,
        batch: &Tensor,
    ) -> Result<GraphModelOutput> {
        let graphs = num_graphs(batch)?;
        let counts = nodes_per_graph(batch, graphs)?;
        let mut sums = vec![0f32; graphs];
        for (label, graph) in labels.to_vec1::<u32>()?.into_iter().zip(batch.to_vec1::<u32>()?) {
            sums[graph as usize] += label as f32;
        }
        let mut rep = Vec::with_capacity(graphs * 2);
        let mut logits = vec![0f32; graphs * 3];
        for g in 0..graphs {
            rep.push(counts[g]);
            rep.push(sums[g]);
            logits[g * 3 + (counts[g] as usize % 3)] = 1.0;
        }
        Ok(GraphModelOutput {
            logits: Tensor::from_vec(logits, (graphs, 3), labels.device())?,
            representation: Tensor::from_vec(rep, (graphs, 2), labels.device())?,
        })
    }
}

/// Returns the same score for every glycan.
pub struct ConstantLectin(pub f32);

impl LectinBindingModel for ConstantLectin {
    fn forward(
        &self,
        protein: &Tensor,
        _labels: &Tensor,
        _edge_index: &Tensor,
        _batch: &Tensor,
    ) -> Result<Tensor> {
        Tensor::full(self.0, (protein.dim(0)?, 1), protein.device())
    }
}

/// Score = sum of the protein feature + node count of the glycan.
pub struct FeatureSumLectin;

impl LectinBindingModel for FeatureSumLectin {
    fn forward(
        &self,
        protein: &Tensor,
        _labels: &Tensor,
        _edge_index: &Tensor,
        batch: &Tensor,
    ) -> Result<Tensor> {
        let graphs = protein.dim(0)?;
        let counts = Tensor::from_vec(nodes_per_graph(batch, graphs)?, graphs, protein.device())?;
        protein.sum(D::Minus1)?.add(&counts)?.unsqueeze(1)
    }
}

/// Token representations whose every hidden unit equals the token id.
pub struct TokenIdPlm {
    pub hidden: usize,
    pub layers: Vec<usize>,
}

impl ProteinLanguageModel for TokenIdPlm {
    fn forward(&self, tokens: &Tensor, repr_layers: &[usize]) -> Result<PlmOutput> {
        let (batch, len) = tokens.dims2()?;
        let reps = tokens
            .to_dtype(DType::F32)?
            .unsqueeze(2)?
            .broadcast_as((batch, len, self.hidden))?
            .contiguous()?;
        let representations: HashMap<usize, Tensor> = repr_layers
            .iter()
            .filter(|layer| self.layers.contains(layer))
            .map(|&layer| (layer, reps.clone()))
            .collect();
        Ok(PlmOutput { representations })
    }
}
