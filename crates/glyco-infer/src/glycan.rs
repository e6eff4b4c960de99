//! Learned glycan representations and class predictions from SweetNet-type models.
use crate::error::{GlycoError, Result};
use crate::loader::{GlycanLoader, LoaderRequest};
use crate::models::GlycanGraphModel;
use bon::Builder;
use candle_core::{DType, Device, Tensor, D};
use polars::prelude::*;
use strum::{Display, EnumString};
use tracing::debug;

/// What [`glycans_to_emb`] returns per glycan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputKind {
    /// The model's latent vector.
    #[default]
    Representation,
    /// The label of the highest-scoring class.
    Class,
}

#[derive(Debug, Clone, Builder)]
pub struct EmbeddingOptions {
    /// Glycoletter vocabulary; the loader's own when unset.
    pub libr: Option<Vec<String>>,
    #[builder(default = 32)]
    pub batch_size: usize,
    #[builder(default)]
    pub output: OutputKind,
    /// Required for [`OutputKind::Class`].
    pub class_list: Option<Vec<String>>,
}

impl Default for EmbeddingOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlycanEmbedding {
    /// One row per glycan.
    Representations(Vec<Vec<f32>>),
    /// One label per glycan.
    Classes(Vec<String>),
}

impl GlycanEmbedding {
    pub fn len(&self) -> usize {
        match self {
            GlycanEmbedding::Representations(rows) => rows.len(),
            GlycanEmbedding::Classes(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Representations become columns named `0..hidden`; classes a single `class` column.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        match self {
            GlycanEmbedding::Representations(rows) => {
                let width = rows.first().map_or(0, Vec::len);
                if let Some(row) = rows.iter().find(|row| row.len() != width) {
                    return Err(GlycoError::LengthMismatch {
                        what: "representation width",
                        expected: width,
                        got: row.len(),
                    });
                }
                let columns = (0..width)
                    .map(|j| {
                        let values: Vec<f32> =
                            rows.iter().filter_map(|row| row.get(j).copied()).collect();
                        Column::new(j.to_string().into(), values)
                    })
                    .collect::<Vec<_>>();
                Ok(DataFrame::new(columns)?)
            }
            GlycanEmbedding::Classes(labels) => Ok(df!("class" => labels)?),
        }
    }
}

/// Runs every glycan through `model` and returns its representation or predicted
/// class, in input order.
pub fn glycans_to_emb<M, L>(
    glycans: &[String],
    model: &M,
    loader: &L,
    options: &EmbeddingOptions,
    device: &Device,
) -> Result<GlycanEmbedding>
where
    M: GlycanGraphModel + ?Sized,
    L: GlycanLoader + ?Sized,
{
    let class_list = match options.output {
        OutputKind::Representation => None,
        OutputKind::Class => Some(
            options
                .class_list
                .as_deref()
                .ok_or(GlycoError::MissingClassList)?,
        ),
    };
    if glycans.is_empty() {
        return Ok(match class_list {
            None => GlycanEmbedding::Representations(Vec::new()),
            Some(_) => GlycanEmbedding::Classes(Vec::new()),
        });
    }

    let targets: Vec<f32> = (0..glycans.len()).map(|i| i as f32).collect();
    let batches = loader.batches(LoaderRequest {
        glycans,
        targets: &targets,
        libr: options.libr.as_deref(),
        batch_size: options.batch_size,
        shuffle: false,
        extra_feature: None,
    })?;

    let mut outputs = Vec::with_capacity(batches.len());
    for (idx, batch) in batches.iter().enumerate() {
        let batch = batch.to_device(device)?;
        let output = model.forward_inference(&batch.labels, &batch.edge_index, &batch.batch)?;
        let output = match options.output {
            OutputKind::Representation => output.representation,
            OutputKind::Class => output.logits,
        };
        debug!(batch = idx, dims = ?output.dims(), "glycan model forward");
        outputs.push(output.detach().to_device(&Device::Cpu)?);
    }
    let stacked = Tensor::cat(&outputs, 0)?;
    let rows = stacked.dim(0)?;
    if rows != glycans.len() {
        return Err(GlycoError::RowCountMismatch {
            expected: glycans.len(),
            got: rows,
        });
    }

    match class_list {
        None => Ok(GlycanEmbedding::Representations(
            stacked.to_dtype(DType::F32)?.to_vec2::<f32>()?,
        )),
        Some(classes) => {
            let labels = stacked
                .argmax(D::Minus1)?
                .to_vec1::<u32>()?
                .into_iter()
                .map(|idx| {
                    classes
                        .get(idx as usize)
                        .cloned()
                        .ok_or(GlycoError::ClassIndexOutOfRange {
                            index: idx as usize,
                            len: classes.len(),
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(GlycanEmbedding::Classes(labels))
        }
    }
}
