use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Most recent PGD SiC export.
pub const DEFAULT_FILE_NAME: &str = "PGD_SiC_2021-01-10.csv";

/// Synthetic export written by `generate_sample`.
pub const SAMPLE_FILE_NAME: &str = "PGD_SiC_sample.csv";

/// `data/` directory shipped next to the crate manifest.
pub fn default_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Where the grain database is read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSource {
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl Default for DataSource {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

impl DataSource {
    /// A file inside the default data directory.
    pub fn with_file(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// The synthetic sample inside the default data directory.
    pub fn sample() -> Self {
        Self::with_file(SAMPLE_FILE_NAME)
    }

    /// Full path of the dataset file.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Read a source description such as `{"file_name": "PGD_SiC_2020.csv"}`.
    /// Omitted fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).context("parsing data source JSON")
    }
}
