//! # Ocorrências Backend
//!
//! Domain layer for the school occurrence registry. This crate owns the
//! record validation rules, the change-detection/audit-trail engine and the
//! record lifecycle, and persists the collection as a single JSON blob.
//! UI layers call into it with plain synchronous function calls and render
//! whatever structured data or error maps come back.
//!
//! - No server, no async: a single-user desktop/browser-shell app.
//! - All domain failures are returned as values ([`domain::OccurrenceError`]),
//!   never as panics.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod storage;

pub use storage::json::{JsonConnection, OccurrenceRepository};

/// Main backend struct that wires the services to a data directory.
pub struct Backend {
    pub occurrence_service: domain::OccurrenceService,
    pub report_service: domain::ReportService,
    pub backup_service: domain::BackupService,
}

impl Backend {
    /// Create a backend persisting under `data_dir`. Loads the stored
    /// collection, falling back to the built-in seed dataset when nothing
    /// usable is on disk.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        let connection = Arc::new(JsonConnection::new(data_dir)?);
        let repository = OccurrenceRepository::new(connection);
        let occurrence_service = domain::OccurrenceService::load(Arc::new(repository));
        Ok(Self {
            occurrence_service,
            report_service: domain::ReportService::new(),
            backup_service: domain::BackupService::new(),
        })
    }
}
