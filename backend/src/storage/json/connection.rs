//! Data-directory handle shared by the JSON repositories.

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed name of the collection blob, the "storage key" of the dataset.
pub const COLLECTION_FILE: &str = "ocorrencias.json";

/// Connection to a JSON data directory.
#[derive(Debug, Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Open (and create if needed) the data directory.
    pub fn new(base_directory: impl AsRef<Path>) -> Result<Self> {
        let base_directory = base_directory.as_ref().to_path_buf();
        fs::create_dir_all(&base_directory).with_context(|| {
            format!("failed to create data directory {}", base_directory.display())
        })?;
        debug!("json storage rooted at {}", base_directory.display());
        Ok(Self { base_directory })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the collection blob.
    pub fn collection_path(&self) -> PathBuf {
        self.base_directory.join(COLLECTION_FILE)
    }
}
