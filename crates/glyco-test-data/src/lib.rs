//! glyco-test-data
//!
//! A module to provide test files embedded in the crate for use in testing.
//! Small embedding stores, background-correction tables and configuration files
//! are included in the crate distribution so tests never need model downloads.
//!
//! The test files are represented as `TestFile` objects which package the raw binary data
//! and create temporary files for programs to operate on.
use std::fs;
use tempfile::{Builder, NamedTempFile};

#[derive(Debug)]
/// Test File
///
/// Example usage:
///
/// ```ignore
/// // returns (filepath, _tempfile_handle).
/// // _handle ensures the tempfile remains in scope
/// use glyco_test_data::TestFile;
/// let (emb_file, _temp) = TestFile::lectin_embeddings_01().create_temp().unwrap();
/// let (csv_file, _temp) = TestFile::background_correction_01().create_temp().unwrap();
/// ```
pub struct TestFile {
    filebinary: &'static [u8],
    suffix: &'static str,
}

impl TestFile {
    /// Two lectin sequences with 4-dimensional embeddings.
    pub fn lectin_embeddings_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/embeddings/lectin_embeddings.json"),
            suffix: "json",
        }
    }
    /// Three 41-residue sequon windows with 3-dimensional embeddings.
    pub fn sequon_embeddings_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/embeddings/sequon_embeddings.json"),
            suffix: "json",
        }
    }
    /// Background values for four glycans, with an extra `source` column.
    pub fn background_correction_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/background/correction_01.csv"),
            suffix: "csv",
        }
    }
    pub fn config_01() -> Self {
        Self {
            filebinary: include_bytes!("../data/config/config_01.json"),
            suffix: "json",
        }
    }
    /// Selects CUDA device 1 and leaves the correction table unset.
    pub fn config_02() -> Self {
        Self {
            filebinary: include_bytes!("../data/config/config_02.json"),
            suffix: "json",
        }
    }

    /// Raw bytes of the file, for readers that take a buffer.
    pub fn bytes(&self) -> &'static [u8] {
        self.filebinary
    }

    pub fn create_temp(&self) -> std::io::Result<(String, NamedTempFile)> {
        let temp = Builder::new()
            .suffix(&format!(".{}", self.suffix))
            .tempfile()?;

        fs::write(&temp, self.filebinary)?;
        let path = temp.path().to_string_lossy().into_owned();

        Ok((path, temp))
    }
}
