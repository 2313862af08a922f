//! Commands and results for occurrence lifecycle operations.
//!
//! Every mutation result carries `persistence_warning`: when the blob write
//! fails after a successful in-memory mutation, the warning is reported
//! here instead of rolling anything back (in-memory state stays
//! authoritative for the session).

use shared::{Occurrence, OccurrenceForm, OccurrenceStatus};

#[derive(Debug, Clone)]
pub struct CreateOccurrenceCommand {
    pub form: OccurrenceForm,
}

#[derive(Debug, Clone)]
pub struct CreateOccurrenceResult {
    pub occurrence: Occurrence,
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UpdateOccurrenceCommand {
    pub occurrence_id: String,
    pub form: OccurrenceForm,
}

#[derive(Debug, Clone)]
pub struct UpdateOccurrenceResult {
    pub occurrence: Occurrence,
    /// False when the submitted form was identical to the stored record;
    /// nothing was appended or stamped in that case.
    pub changed: bool,
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SetStatusCommand {
    pub occurrence_id: String,
    pub status: OccurrenceStatus,
}

#[derive(Debug, Clone)]
pub struct SetStatusResult {
    pub occurrence: Occurrence,
    /// False when the record already carried the requested status.
    pub changed: bool,
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteOccurrenceCommand {
    pub occurrence_id: String,
}

#[derive(Debug, Clone)]
pub struct DeleteOccurrenceResult {
    pub persistence_warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReplaceAllResult {
    pub record_count: usize,
    pub persistence_warning: Option<String>,
}
