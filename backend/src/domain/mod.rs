//! Domain services for the occurrence registry.

pub mod audit;
pub mod backup_service;
pub mod commands;
pub mod errors;
pub mod occurrence_service;
pub mod report_service;
pub mod seed;
pub mod validation;

pub use backup_service::BackupService;
pub use errors::OccurrenceError;
pub use occurrence_service::OccurrenceService;
pub use report_service::ReportService;
