//! Lectin–glycan binding predictions from LectinOracle-type models.
use crate::coding::prot_to_coded;
use crate::correction::BackgroundCorrection;
use crate::embeddings::EmbeddingStore;
use crate::error::{GlycoError, Result};
use crate::loader::{GlycanLoader, LoaderRequest};
use crate::models::LectinBindingModel;
use bon::Builder;
use candle_core::{DType, Device, IndexOp};
use polars::prelude::*;
use strum::{Display, EnumString};
use tracing::{debug, warn};

/// Target placeholder handed to the loader; binding inference ignores it.
const PLACEHOLDER_TARGET: f32 = 0.99;

/// How the protein is presented to the model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum LectinOracleVariant {
    /// LectinOracle: a pre-computed protein embedding.
    #[default]
    Fixed,
    /// LectinOracle_flex: the integer-coded raw sequence.
    Flex,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProteinInput {
    Sequence(String),
    /// An embedding computed elsewhere; only valid for [`LectinOracleVariant::Fixed`].
    Embedding(Vec<f32>),
}

impl From<&str> for ProteinInput {
    fn from(sequence: &str) -> Self {
        ProteinInput::Sequence(sequence.to_string())
    }
}

impl From<String> for ProteinInput {
    fn from(sequence: String) -> Self {
        ProteinInput::Sequence(sequence)
    }
}

impl From<Vec<f32>> for ProteinInput {
    fn from(embedding: Vec<f32>) -> Self {
        ProteinInput::Embedding(embedding)
    }
}

#[derive(Debug, Clone, Builder)]
pub struct MultiPredOptions {
    #[builder(default)]
    pub background_correction: bool,
    #[builder(default = 128)]
    pub batch_size: usize,
    pub libr: Option<Vec<String>>,
    #[builder(default)]
    pub variant: LectinOracleVariant,
}

impl Default for MultiPredOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, Builder)]
pub struct LectinPredOptions {
    #[builder(default)]
    pub background_correction: bool,
    #[builder(default = 128)]
    pub batch_size: usize,
    pub libr: Option<Vec<String>>,
    /// Order rows by ascending prediction.
    #[builder(default = true)]
    pub sort: bool,
    #[builder(default)]
    pub variant: LectinOracleVariant,
}

impl Default for LectinPredOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LectinPrediction {
    pub motif: String,
    pub pred: f32,
}

impl LectinPrediction {
    pub fn new(motif: impl Into<String>, pred: f32) -> Self {
        Self {
            motif: motif.into(),
            pred,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LectinPredictions {
    pub rows: Vec<LectinPrediction>,
}

impl LectinPredictions {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LectinPrediction> {
        self.rows.iter()
    }

    pub fn preds(&self) -> Vec<f32> {
        self.rows.iter().map(|row| row.pred).collect()
    }

    /// Stable ascending sort on `pred`.
    pub fn sort_ascending(&mut self) {
        self.rows.sort_by(|a, b| a.pred.total_cmp(&b.pred));
    }

    /// `motif` and `pred` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let (motifs, preds): (Vec<&str>, Vec<f32>) = self
            .rows
            .iter()
            .map(|row| (row.motif.as_str(), row.pred))
            .unzip();
        Ok(df!("motif" => motifs, "pred" => preds)?)
    }
}

impl<'a> IntoIterator for &'a LectinPredictions {
    type Item = &'a LectinPrediction;
    type IntoIter = std::slice::Iter<'a, LectinPrediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Per-glycan protein feature for the chosen variant.
fn protein_feature(
    protein: &ProteinInput,
    embeddings: &EmbeddingStore,
    variant: LectinOracleVariant,
) -> Result<Vec<f32>> {
    match (variant, protein) {
        (LectinOracleVariant::Flex, ProteinInput::Sequence(sequence)) => {
            Ok(prot_to_coded(sequence))
        }
        (LectinOracleVariant::Flex, ProteinInput::Embedding(_)) => {
            Err(GlycoError::FlexRequiresSequence)
        }
        (LectinOracleVariant::Fixed, ProteinInput::Embedding(embedding)) => Ok(embedding.clone()),
        (LectinOracleVariant::Fixed, ProteinInput::Sequence(sequence)) => {
            match embeddings.get(sequence) {
                Some(embedding) => Ok(embedding.to_vec()),
                None => {
                    warn!(
                        protein_len = sequence.len(),
                        "new protein, no stored embedding"
                    );
                    Err(GlycoError::MissingEmbedding(sequence.clone()))
                }
            }
        }
    }
}

/// The bundled table, with a warning when it carries no background values.
fn bundled_correction() -> Result<&'static BackgroundCorrection> {
    let table = BackgroundCorrection::bundled()?;
    if table.is_empty() {
        warn!(
            "bundled background correction table is empty; \
             pass a table to apply background correction"
        );
    }
    Ok(table)
}

/// Predicted binding of one protein to every glycan, in input order.
///
/// With `background_correction` the glycan's background value is subtracted
/// (`correction`, or the bundled table when `None`). Glycans without a
/// background value are left as predicted and reported in one warning.
#[allow(clippy::too_many_arguments)]
pub fn get_multi_pred<M, L>(
    protein: &ProteinInput,
    glycans: &[String],
    model: &M,
    loader: &L,
    embeddings: &EmbeddingStore,
    correction: Option<&BackgroundCorrection>,
    options: &MultiPredOptions,
    device: &Device,
) -> Result<Vec<f32>>
where
    M: LectinBindingModel + ?Sized,
    L: GlycanLoader + ?Sized,
{
    let feature = protein_feature(protein, embeddings, options.variant)?;
    let features = vec![feature; glycans.len()];
    let targets = vec![PLACEHOLDER_TARGET; glycans.len()];
    let batches = loader.batches(LoaderRequest {
        glycans,
        targets: &targets,
        libr: options.libr.as_deref(),
        batch_size: options.batch_size,
        shuffle: false,
        extra_feature: Some(&features),
    })?;

    let mut preds = Vec::with_capacity(glycans.len());
    for (idx, batch) in batches.iter().enumerate() {
        let batch = batch.to_device(device)?;
        let prot = batch
            .extra
            .as_ref()
            .ok_or(GlycoError::MissingExtraFeature)?
            .reshape((batch.num_graphs, ()))?
            .to_dtype(DType::F32)?;
        let pred = model.forward(&prot, &batch.labels, &batch.edge_index, &batch.batch)?;
        let pred = pred.detach().to_device(&Device::Cpu)?;
        // [graphs, 1] → first column
        let pred = if pred.rank() > 1 { pred.i((.., 0))? } else { pred };
        debug!(batch = idx, graphs = batch.num_graphs, "lectin model forward");
        preds.extend(pred.to_dtype(DType::F32)?.to_vec1::<f32>()?);
    }
    if preds.len() != glycans.len() {
        return Err(GlycoError::RowCountMismatch {
            expected: glycans.len(),
            got: preds.len(),
        });
    }

    if !options.background_correction {
        return Ok(preds);
    }
    let table = match correction {
        Some(table) => table,
        None => bundled_correction()?,
    };
    Ok(table.subtract(glycans, &preds)?.values)
}

/// Binding predictions of one protein against `glycans` as a `(motif, pred)` table.
///
/// Background correction here only touches glycans present in the table; the
/// others keep their raw prediction without a warning.
#[allow(clippy::too_many_arguments)]
pub fn get_lectin_preds<M, L>(
    protein: &ProteinInput,
    glycans: &[String],
    model: &M,
    loader: &L,
    embeddings: &EmbeddingStore,
    correction: Option<&BackgroundCorrection>,
    options: &LectinPredOptions,
    device: &Device,
) -> Result<LectinPredictions>
where
    M: LectinBindingModel + ?Sized,
    L: GlycanLoader + ?Sized,
{
    if embeddings.is_empty()
        && options.variant == LectinOracleVariant::Fixed
        && matches!(protein, ProteinInput::Sequence(_))
    {
        warn!(
            "no protein:ESM-1b representations were provided; \
             LectinOracle needs an embedding for the protein"
        );
    }
    let multi_options = MultiPredOptions {
        background_correction: false,
        batch_size: options.batch_size,
        libr: options.libr.clone(),
        variant: options.variant,
    };
    let preds = get_multi_pred(
        protein,
        glycans,
        model,
        loader,
        embeddings,
        None,
        &multi_options,
        device,
    )?;

    let mut table_out = LectinPredictions {
        rows: glycans
            .iter()
            .zip(preds)
            .map(|(motif, pred)| LectinPrediction::new(motif.clone(), pred))
            .collect(),
    };
    if options.background_correction {
        let table = match correction {
            Some(table) => table,
            None => bundled_correction()?,
        };
        let corrected = table.correct_rows(&mut table_out.rows);
        debug!(corrected, rows = table_out.len(), "background corrected");
    }
    if options.sort {
        table_out.sort_ascending();
    }
    Ok(table_out)
}
