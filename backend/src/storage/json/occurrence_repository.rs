//! JSON-file repository for the occurrence collection.

use anyhow::{Context, Result};
use log::{debug, info};
use shared::Occurrence;
use std::fs;
use std::sync::Arc;

use super::connection::JsonConnection;
use crate::storage::traits::OccurrenceStore;

/// Stores the whole collection as one pretty JSON array.
#[derive(Clone)]
pub struct OccurrenceRepository {
    connection: Arc<JsonConnection>,
}

impl OccurrenceRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }
}

impl OccurrenceStore for OccurrenceRepository {
    fn load_all(&self) -> Result<Option<Vec<Occurrence>>> {
        let path = self.connection.collection_path();
        if !path.exists() {
            debug!("no collection blob at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let occurrences: Vec<Occurrence> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        info!("loaded {} occurrences from {}", occurrences.len(), path.display());
        Ok(Some(occurrences))
    }

    fn save_all(&self, occurrences: &[Occurrence]) -> Result<()> {
        let path = self.connection.collection_path();
        let content = serde_json::to_string_pretty(occurrences)
            .context("failed to serialize occurrence collection")?;

        // Write to a temp file in the same directory, then rename over the
        // blob so readers never observe a partial write.
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("failed to move {} into place", temp_path.display()))?;

        debug!("saved {} occurrences to {}", occurrences.len(), path.display());
        Ok(())
    }
}
