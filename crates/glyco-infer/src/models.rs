//! Model interfaces.
//!
//! Architectures live outside this crate. Anything that can run a forward pass
//! with these signatures can be driven by the inference functions; the
//! NSequonPred-type classifier is any [`candle_core::Module`].
use candle_core::{Result, Tensor};
use std::collections::HashMap;

/// SweetNet-type output in inference mode.
#[derive(Debug, Clone)]
pub struct GraphModelOutput {
    /// Class scores, `[graphs, classes]`.
    pub logits: Tensor,
    /// Latent representation, `[graphs, hidden]`.
    pub representation: Tensor,
}

/// A graph neural network over glycans (SweetNet and relatives).
pub trait GlycanGraphModel {
    fn forward_inference(
        &self,
        labels: &Tensor,
        edge_index: &Tensor,
        batch: &Tensor,
    ) -> Result<GraphModelOutput>;
}

/// A protein + glycan binding model (LectinOracle and LectinOracle_flex).
///
/// `protein` is `[graphs, features]`: a protein embedding for the fixed variant
/// or the integer-coded sequence for the flex variant. Returns `[graphs, 1]`.
pub trait LectinBindingModel {
    fn forward(
        &self,
        protein: &Tensor,
        labels: &Tensor,
        edge_index: &Tensor,
        batch: &Tensor,
    ) -> Result<Tensor>;
}

#[derive(Debug, Clone, Default)]
pub struct PlmOutput {
    /// Per-layer token representations, `[batch, tokens, hidden]`.
    pub representations: HashMap<usize, Tensor>,
}

/// A protein language model (ESM-1b and relatives).
pub trait ProteinLanguageModel {
    fn forward(&self, tokens: &Tensor, repr_layers: &[usize]) -> Result<PlmOutput>;
}
