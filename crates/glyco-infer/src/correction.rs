//! Background correction of binding predictions.
//!
//! LectinOracle predictions carry a glycan-specific baseline (signal that every
//! lectin produces on that glycan). The table here maps glycan → baseline and is
//! subtracted from raw predictions.
use crate::error::{GlycoError, Result};
use crate::lectin::LectinPrediction;
use polars::prelude::*;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

const BUNDLED_CSV: &[u8] = include_bytes!("../data/lectinoracle_background_correction.csv");

static BUNDLED: OnceLock<BackgroundCorrection> = OnceLock::new();

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackgroundCorrection {
    offsets: HashMap<String, f32>,
}

/// Output of [`BackgroundCorrection::subtract`].
#[derive(Debug, Clone, PartialEq)]
pub struct Corrected {
    pub values: Vec<f32>,
    /// Glycans with no entry in the table; they were corrected by 0.
    pub missing: Vec<String>,
}

impl BackgroundCorrection {
    /// The table shipped with the crate, parsed on first use.
    pub fn bundled() -> Result<&'static BackgroundCorrection> {
        if let Some(table) = BUNDLED.get() {
            return Ok(table);
        }
        let table = Self::from_csv_bytes(BUNDLED_CSV)?;
        Ok(BUNDLED.get_or_init(|| table))
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()?;
        Self::from_dataframe(&df)
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()?;
        Self::from_dataframe(&df)
    }

    /// Reads the `motif` and `pred` columns; other columns are ignored and rows
    /// with a null in either column are dropped. A repeated motif keeps its last value.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let motifs = df
            .column("motif")
            .map_err(|_| GlycoError::MissingColumn("motif"))?
            .as_materialized_series()
            .cast(&DataType::String)?;
        let preds = df
            .column("pred")
            .map_err(|_| GlycoError::MissingColumn("pred"))?
            .as_materialized_series()
            .cast(&DataType::Float32)?;

        let offsets = motifs
            .str()?
            .into_iter()
            .zip(preds.f32()?.into_iter())
            .filter_map(|(motif, pred)| Some((motif?.to_string(), pred?)))
            .collect();
        Ok(Self { offsets })
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let (motifs, preds): (Vec<&str>, Vec<f32>) = self
            .offsets
            .iter()
            .map(|(motif, pred)| (motif.as_str(), *pred))
            .unzip();
        Ok(df!("motif" => motifs, "pred" => preds)?)
    }

    pub fn get(&self, glycan: &str) -> Option<f32> {
        self.offsets.get(glycan).copied()
    }

    pub fn insert(&mut self, glycan: impl Into<String>, offset: f32) -> Option<f32> {
        self.offsets.insert(glycan.into(), offset)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// `pred - offset` per glycan, with offset 0 for glycans absent from the table.
    ///
    /// Emits a single warning naming how many glycans were uncovered.
    pub fn subtract(&self, glycans: &[String], preds: &[f32]) -> Result<Corrected> {
        if glycans.len() != preds.len() {
            return Err(GlycoError::LengthMismatch {
                what: "predictions",
                expected: glycans.len(),
                got: preds.len(),
            });
        }
        let mut missing = Vec::new();
        let values = glycans
            .iter()
            .zip(preds)
            .map(|(glycan, pred)| match self.get(glycan) {
                Some(offset) => pred - offset,
                None => {
                    missing.push(glycan.clone());
                    *pred
                }
            })
            .collect();
        if !missing.is_empty() {
            warn!(
                missing = missing.len(),
                "not all glycans are in the background correction table; \
                 consider adding their background values"
            );
        }
        Ok(Corrected { values, missing })
    }

    /// Subtracts the offset of every row whose glycan is in the table and leaves
    /// the rest untouched. Returns the number of rows corrected.
    pub fn correct_rows(&self, rows: &mut [LectinPrediction]) -> usize {
        let mut corrected = 0;
        for row in rows.iter_mut() {
            if let Some(offset) = self.get(&row.motif) {
                row.pred -= offset;
                corrected += 1;
            }
        }
        corrected
    }
}

impl FromIterator<(String, f32)> for BackgroundCorrection {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self {
            offsets: iter.into_iter().collect(),
        }
    }
}
