//! Error taxonomy of the domain layer.
//!
//! Everything here is returned as a value and rendered by the caller; the
//! only thing treated as success-with-no-change (not an error) is an update
//! or status change that turns out to be a no-op.

use shared::ValidationErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OccurrenceError {
    /// Field-level failures, rendered inline next to each offending field.
    /// No mutation has happened when this is returned.
    #[error("dados inválidos para a ficha de ocorrência")]
    Validation(ValidationErrors),

    /// The referenced record does not exist (update/status/delete).
    #[error("ocorrência não encontrada: {0}")]
    NotFound(String),

    /// Malformed restore input; blocks the whole replace operation before
    /// any mutation.
    #[error("arquivo de backup inválido: {0}")]
    Structural(String),

    /// A single-record export is missing required fields. Lists every
    /// missing field, not just the first one.
    #[error("ficha incompleta para impressão. Campos obrigatórios ausentes: {}", missing.join(", "))]
    PrintReadiness { missing: Vec<String> },
}

impl OccurrenceError {
    /// Borrow the error map when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            OccurrenceError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
