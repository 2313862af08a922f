//! Backup export and restore parsing.
//!
//! A backup is the whole collection as pretty JSON, the same shape as the
//! persistence blob. Restore input is user-supplied, so it gets a shallow
//! structural check (array of objects, each with an `id` and a `student`
//! object) before typed deserialization; field rules are deliberately not
//! re-run, because a backup is a trusted prior export, not form input.

use chrono::Local;
use log::{info, warn};
use serde_json::Value;
use shared::{BackupFile, Occurrence};

use crate::domain::errors::OccurrenceError;

#[derive(Clone, Default)]
pub struct BackupService;

impl BackupService {
    pub fn new() -> Self {
        Self
    }

    /// Serialize the collection into a downloadable backup file, named
    /// `backup_ocorrencias_<ISO-date>.json`.
    pub fn export(&self, occurrences: &[Occurrence]) -> Result<BackupFile, OccurrenceError> {
        let content = serde_json::to_string_pretty(occurrences).map_err(|e| {
            OccurrenceError::Structural(format!("falha ao serializar o backup: {e}"))
        })?;
        let filename = format!(
            "backup_ocorrencias_{}.json",
            Local::now().format("%Y-%m-%d")
        );
        info!("exported backup {} with {} records", filename, occurrences.len());
        Ok(BackupFile {
            filename,
            content,
            record_count: occurrences.len(),
        })
    }

    /// Parse restore input. Any parse or structural failure is reported
    /// without touching the current collection (the caller only calls
    /// `replace_all` with a successfully parsed list).
    pub fn parse(&self, content: &str) -> Result<Vec<Occurrence>, OccurrenceError> {
        let value: Value = serde_json::from_str(content).map_err(|e| {
            warn!("restore input is not valid JSON: {e}");
            OccurrenceError::Structural(format!("JSON inválido: {e}"))
        })?;

        let items = value.as_array().ok_or_else(|| {
            OccurrenceError::Structural(
                "o arquivo deve conter uma lista de ocorrências".to_string(),
            )
        })?;

        for (index, item) in items.iter().enumerate() {
            let record = item.as_object().ok_or_else(|| {
                OccurrenceError::Structural(format!("registro {} não é um objeto", index + 1))
            })?;
            if !record.get("id").map_or(false, Value::is_string) {
                return Err(OccurrenceError::Structural(format!(
                    "registro {} sem campo 'id'",
                    index + 1
                )));
            }
            if !record.get("student").map_or(false, Value::is_object) {
                return Err(OccurrenceError::Structural(format!(
                    "registro {} sem objeto 'student'",
                    index + 1
                )));
            }
        }

        let occurrences: Vec<Occurrence> = serde_json::from_value(value).map_err(|e| {
            warn!("restore input failed typed deserialization: {e}");
            OccurrenceError::Structural(format!("estrutura de registro inválida: {e}"))
        })?;
        info!("parsed restore input with {} records", occurrences.len());
        Ok(occurrences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::seed;

    fn service() -> BackupService {
        BackupService::new()
    }

    #[test]
    fn export_then_parse_round_trips_the_collection() {
        let records = seed::seed_occurrences();
        let backup = service().export(&records).unwrap();

        assert!(backup.filename.starts_with("backup_ocorrencias_"));
        assert!(backup.filename.ends_with(".json"));
        assert_eq!(backup.record_count, records.len());

        let restored = service().parse(&backup.content).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn non_json_input_is_structural() {
        let err = service().parse("definitely not json").unwrap_err();
        assert!(matches!(err, OccurrenceError::Structural(_)));
    }

    #[test]
    fn non_array_input_is_structural() {
        let err = service().parse(r#"{"id": "OCC-1"}"#).unwrap_err();
        assert!(matches!(err, OccurrenceError::Structural(_)));
    }

    #[test]
    fn element_missing_id_is_structural() {
        let err = service()
            .parse(r#"[{"student": {"fullName": "Ana"}}]"#)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'id'"), "unexpected message: {message}");
    }

    #[test]
    fn element_missing_student_is_structural() {
        let err = service().parse(r#"[{"id": "OCC-1"}]"#).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'student'"), "unexpected message: {message}");
    }

    #[test]
    fn empty_array_is_a_valid_backup() {
        assert!(service().parse("[]").unwrap().is_empty());
    }
}
