use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GlycoError>;

#[derive(Debug, Error)]
pub enum GlycoError {
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no stored embedding for sequence {0}")]
    MissingEmbedding(String),

    #[error("flex models code the raw sequence; a pre-computed embedding cannot be used")]
    FlexRequiresSequence,

    #[error("mini-batch is missing the per-sample protein feature")]
    MissingExtraFeature,

    #[error("class predictions requested without a class list")]
    MissingClassList,

    #[error("predicted class index {index} is outside a class list of length {len}")]
    ClassIndexOutOfRange { index: usize, len: usize },

    #[error("model output has no representations for layer {0}")]
    MissingLayer(usize),

    #[error("expected {expected} output rows, model produced {got}")]
    RowCountMismatch { expected: usize, got: usize },

    #[error("embedding for {sequence} has width {got}, expected {expected}")]
    EmbeddingDimMismatch {
        sequence: String,
        expected: usize,
        got: usize,
    },

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    #[error("{what}: expected {expected} entries, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("could not encode glycan {glycan}: {message}")]
    Encoding { glycan: String, message: String },

    #[error("position {position} is not an asparagine in a sequence of length {len}")]
    InvalidSequonPosition { position: usize, len: usize },

    #[error("table is missing required column `{0}`")]
    MissingColumn(&'static str),
}
