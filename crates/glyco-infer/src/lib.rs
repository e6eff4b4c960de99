//! glyco-infer
//!
//! Batched inference and post-processing for pretrained glycan models:
//! SweetNet-type representations, LectinOracle binding predictions with
//! background correction, ESM-1b protein embeddings and NSequonPred
//! glycosylation probabilities.
//!
//! Model architectures and glycan graph construction are supplied by the caller
//! through the traits in [`models`] and [`loader`]. Every operation takes the
//! compute device explicitly.
//!
//! ```shell
//! cargo test -p glyco-infer
//! cargo test -p glyco-infer --features metal
//! ```
pub use coding::{prot_to_coded, MAX_PROTEIN_LEN};
pub use config::{device, DeviceChoice, InferenceConfig};
pub use correction::{BackgroundCorrection, Corrected};
pub use embeddings::EmbeddingStore;
pub use error::{GlycoError, Result};
pub use esm::{get_esm1b_representations, EmbeddingConfig, EsmAlphabet};
pub use glycan::{glycans_to_emb, EmbeddingOptions, GlycanEmbedding, OutputKind};
pub use lectin::{
    get_lectin_preds, get_multi_pred, LectinOracleVariant, LectinPredOptions, LectinPrediction,
    LectinPredictions, MultiPredOptions, ProteinInput,
};
pub use loader::{
    GlycanGraph, GlycanGraphEncoder, GlycanLoader, GraphBatch, GraphDataLoader, LoaderRequest,
};
pub use models::{
    GlycanGraphModel, GraphModelOutput, LectinBindingModel, PlmOutput, ProteinLanguageModel,
};
pub use sequon::{
    find_sequons, get_nsequon_preds, sequon_window, sequon_windows, SequonPrediction,
    SequonPredictions,
};

pub mod coding;
pub mod config;
pub mod correction;
pub mod embeddings;
pub mod error;
pub mod esm;
pub mod glycan;
pub mod lectin;
pub mod loader;
pub mod models;
pub mod sequon;
