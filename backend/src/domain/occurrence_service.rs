//! Record lifecycle management.
//!
//! `OccurrenceService` owns the authoritative in-memory collection (newest
//! first) and is the only writer. Persistence is a side effect injected as
//! an [`OccurrenceStore`]: invoked after each successful mutation, and a
//! failed write is reported as a warning without rolling the mutation back.

use chrono::{Local, Timelike, Utc};
use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;

use shared::{compute_age, AuditAction, AuditEntry, Occurrence, OccurrenceStatus, StatusSummary};

use crate::domain::audit::{self, CREATION_DETAILS};
use crate::domain::commands::{
    CreateOccurrenceCommand, CreateOccurrenceResult, DeleteOccurrenceCommand,
    DeleteOccurrenceResult, ReplaceAllResult, SetStatusCommand, SetStatusResult,
    UpdateOccurrenceCommand, UpdateOccurrenceResult,
};
use crate::domain::errors::OccurrenceError;
use crate::domain::{seed, validation};
use crate::storage::traits::OccurrenceStore;

/// Service owning the occurrence collection.
pub struct OccurrenceService {
    occurrences: Vec<Occurrence>,
    store: Arc<dyn OccurrenceStore>,
}

impl OccurrenceService {
    /// Load the collection from the store. Nothing stored yet, or an
    /// unreadable blob, falls back to the built-in seed dataset.
    pub fn load(store: Arc<dyn OccurrenceStore>) -> Self {
        let occurrences = match store.load_all() {
            Ok(Some(stored)) => {
                info!("loaded {} occurrences from storage", stored.len());
                stored
            }
            Ok(None) => {
                info!("no stored collection, starting from seed data");
                seed::seed_occurrences()
            }
            Err(e) => {
                warn!("stored collection unreadable, starting from seed data: {e:#}");
                seed::seed_occurrences()
            }
        };
        Self { occurrences, store }
    }

    /// Register a new occurrence.
    ///
    /// On success the record starts as `Aberta` with a single creation
    /// audit entry and is prepended to the collection.
    pub fn create(
        &mut self,
        command: CreateOccurrenceCommand,
    ) -> Result<CreateOccurrenceResult, OccurrenceError> {
        let errors = validation::validate(&command.form);
        if !errors.is_empty() {
            return Err(OccurrenceError::Validation(errors));
        }

        let now_local = Local::now();
        let mut form = command.form;
        form.student.age = form
            .student
            .birth_date
            .map(|birth| compute_age(birth, now_local.date_naive()))
            .unwrap_or(0);
        if form.filling_date.is_none() {
            form.filling_date = Some(now_local.date_naive());
        }
        if form.filling_time.is_none() {
            let time = now_local.time();
            form.filling_time = Some(time.with_second(0).unwrap_or(time));
        }

        let now = Utc::now();
        let occurrence = Occurrence {
            id: self.generate_id(),
            form,
            status: OccurrenceStatus::Open,
            created_at: now,
            updated_at: now,
            audit_log: vec![AuditEntry::new(AuditAction::Creation, CREATION_DETAILS)],
        };

        info!(
            "created occurrence {} for student {}",
            occurrence.id, occurrence.form.student.full_name
        );
        self.occurrences.insert(0, occurrence.clone());
        Ok(CreateOccurrenceResult {
            occurrence,
            persistence_warning: self.persist(),
        })
    }

    /// Re-validate and apply an edited form to an existing record.
    ///
    /// Idempotent for identical input: when nothing actually changed, the
    /// stored record is returned untouched (same `updated_at`, same audit
    /// trail).
    pub fn update(
        &mut self,
        command: UpdateOccurrenceCommand,
    ) -> Result<UpdateOccurrenceResult, OccurrenceError> {
        let index = self
            .index_of(&command.occurrence_id)
            .ok_or_else(|| OccurrenceError::NotFound(command.occurrence_id.clone()))?;

        let errors = validation::validate(&command.form);
        if !errors.is_empty() {
            return Err(OccurrenceError::Validation(errors));
        }

        let existing = &self.occurrences[index];
        let mut candidate = existing.clone();
        candidate.form = command.form;
        candidate.form.student.age = candidate
            .form
            .student
            .birth_date
            .map(|birth| compute_age(birth, Local::now().date_naive()))
            .unwrap_or(0);

        let details = audit::summarize_changes(existing, &candidate);
        if details.is_empty() {
            info!("update of {} was a no-op", existing.id);
            return Ok(UpdateOccurrenceResult {
                occurrence: existing.clone(),
                changed: false,
                persistence_warning: None,
            });
        }

        candidate
            .audit_log
            .push(AuditEntry::new(AuditAction::DataEdit, details));
        candidate.updated_at = Utc::now();

        info!("updated occurrence {}", candidate.id);
        self.occurrences[index] = candidate.clone();
        Ok(UpdateOccurrenceResult {
            occurrence: candidate,
            changed: true,
            persistence_warning: self.persist(),
        })
    }

    /// Move a record to another status. Any status is reachable from any
    /// other; only the no-op transition is suppressed.
    pub fn set_status(
        &mut self,
        command: SetStatusCommand,
    ) -> Result<SetStatusResult, OccurrenceError> {
        let index = self
            .index_of(&command.occurrence_id)
            .ok_or_else(|| OccurrenceError::NotFound(command.occurrence_id.clone()))?;

        let occurrence = &mut self.occurrences[index];
        if occurrence.status == command.status {
            return Ok(SetStatusResult {
                occurrence: occurrence.clone(),
                changed: false,
                persistence_warning: None,
            });
        }

        let details = audit::status_change_details(occurrence.status, command.status);
        occurrence.status = command.status;
        occurrence
            .audit_log
            .push(AuditEntry::new(AuditAction::StatusUpdate, details));
        occurrence.updated_at = Utc::now();

        info!("occurrence {} is now '{}'", occurrence.id, occurrence.status);
        let occurrence = occurrence.clone();
        Ok(SetStatusResult {
            occurrence,
            changed: true,
            persistence_warning: self.persist(),
        })
    }

    /// Remove a record and its audit trail entirely. No tombstone.
    pub fn delete(
        &mut self,
        command: DeleteOccurrenceCommand,
    ) -> Result<DeleteOccurrenceResult, OccurrenceError> {
        let index = self
            .index_of(&command.occurrence_id)
            .ok_or_else(|| OccurrenceError::NotFound(command.occurrence_id.clone()))?;
        self.occurrences.remove(index);
        info!("deleted occurrence {}", command.occurrence_id);
        Ok(DeleteOccurrenceResult {
            persistence_warning: self.persist(),
        })
    }

    /// Replace the whole collection, used by restore.
    ///
    /// Only structural shape is enforced (ids present and unique); restored
    /// backups are trusted exports, so field rules are not re-run. The check
    /// happens before any mutation, making the replace all-or-nothing.
    pub fn replace_all(
        &mut self,
        records: Vec<Occurrence>,
    ) -> Result<ReplaceAllResult, OccurrenceError> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.id.trim().is_empty() {
                return Err(OccurrenceError::Structural(
                    "registro sem identificador".to_string(),
                ));
            }
            if !seen.insert(record.id.as_str()) {
                return Err(OccurrenceError::Structural(format!(
                    "identificador duplicado: {}",
                    record.id
                )));
            }
        }

        info!(
            "replacing collection: {} -> {} records",
            self.occurrences.len(),
            records.len()
        );
        self.occurrences = records;
        Ok(ReplaceAllResult {
            record_count: self.occurrences.len(),
            persistence_warning: self.persist(),
        })
    }

    /// Read-only snapshot of the collection, newest first.
    pub fn list(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn get(&self, occurrence_id: &str) -> Option<&Occurrence> {
        self.occurrences.iter().find(|o| o.id == occurrence_id)
    }

    /// Case-insensitive filter over student name, description and id.
    pub fn search(&self, term: &str) -> Vec<&Occurrence> {
        let needle = term.to_lowercase();
        self.occurrences
            .iter()
            .filter(|o| {
                o.form.student.full_name.to_lowercase().contains(&needle)
                    || o.form.detailed_description.to_lowercase().contains(&needle)
                    || o.id.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Per-status counts for the dashboard cards.
    pub fn status_summary(&self) -> StatusSummary {
        let mut summary = StatusSummary {
            total: self.occurrences.len(),
            ..Default::default()
        };
        for occurrence in &self.occurrences {
            match occurrence.status {
                OccurrenceStatus::Open => summary.open += 1,
                OccurrenceStatus::InProgress => summary.in_progress += 1,
                OccurrenceStatus::Resolved => summary.resolved += 1,
                OccurrenceStatus::Closed => summary.closed += 1,
            }
        }
        summary
    }

    fn index_of(&self, occurrence_id: &str) -> Option<usize> {
        self.occurrences.iter().position(|o| o.id == occurrence_id)
    }

    /// Fresh `OCC-<epoch-millis>` id, bumped past any collision.
    fn generate_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("OCC-{millis}");
            if !self.occurrences.iter().any(|o| o.id == id) {
                return id;
            }
            millis += 1;
        }
    }

    /// Write-through after a successful mutation. A failed write is logged
    /// and surfaced as a warning; in-memory state stays authoritative.
    fn persist(&self) -> Option<String> {
        match self.store.save_all(&self.occurrences) {
            Ok(()) => None,
            Err(e) => {
                warn!("persistence write failed: {e:#}");
                Some(format!("Falha ao salvar os dados: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::json::{JsonConnection, OccurrenceRepository};
    use anyhow::anyhow;
    use chrono::{NaiveDate, NaiveTime};
    use shared::{Guardian, OccurrenceForm, OccurrenceType, Student};

    fn create_test_service() -> (OccurrenceService, tempfile::TempDir) {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let connection = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        let repository = Arc::new(OccurrenceRepository::new(connection));
        let mut service = OccurrenceService::load(repository);
        // Start from an empty collection so counts are predictable.
        service.replace_all(Vec::new()).unwrap();
        (service, temp_dir)
    }

    fn valid_form() -> OccurrenceForm {
        OccurrenceForm {
            school_unit: "Escola Municipal Dr. Abdias de Menezes".to_string(),
            municipality: "Itaberaba".to_string(),
            uf: "BA".to_string(),
            filling_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            filling_time: NaiveTime::from_hms_opt(11, 0, 0),
            student: Student {
                full_name: "Rafael Mota Cardoso".to_string(),
                birth_date: NaiveDate::from_ymd_opt(2011, 8, 30),
                age: 0,
                grade: "9º Ano".to_string(),
                shift: "Matutino".to_string(),
                enrollment_id: "20240112".to_string(),
                photo_url: None,
            },
            guardian: Guardian {
                full_name: "Sandra Mota".to_string(),
                relationship: "Mãe".to_string(),
                phone: "75988776655".to_string(),
                address: "Rua do Cajueiro, 250, Centro".to_string(),
            },
            occurrence_date: NaiveDate::from_ymd_opt(2024, 5, 10),
            occurrence_time: NaiveTime::from_hms_opt(9, 15, 0),
            location: "Sala de aula".to_string(),
            occurrence_types: vec![OccurrenceType::PropertyDamage],
            other_occurrence_type: None,
            detailed_description: "Carteira danificada durante discussão em sala.".to_string(),
            involved_people: "Rafael Mota e um colega".to_string(),
            immediate_actions: "Registro e comunicação ao responsável.".to_string(),
            referrals: String::new(),
            social_service_evaluation: None,
            observations: None,
        }
    }

    fn create_record(service: &mut OccurrenceService) -> Occurrence {
        service
            .create(CreateOccurrenceCommand { form: valid_form() })
            .unwrap()
            .occurrence
    }

    #[test]
    fn create_assigns_id_status_and_single_creation_entry() {
        let (mut service, _dir) = create_test_service();
        let result = service.create(CreateOccurrenceCommand { form: valid_form() }).unwrap();
        let occurrence = result.occurrence;

        assert!(occurrence.id.starts_with("OCC-"));
        assert_eq!(occurrence.status, OccurrenceStatus::Open);
        assert_eq!(occurrence.created_at, occurrence.updated_at);
        assert_eq!(occurrence.audit_log.len(), 1);
        assert_eq!(occurrence.audit_log[0].action, AuditAction::Creation);
        assert_eq!(occurrence.audit_log[0].details, CREATION_DETAILS);
        assert_eq!(occurrence.audit_log[0].user, "Sistema");
        assert!(result.persistence_warning.is_none());
    }

    #[test]
    fn create_recomputes_age_from_birth_date() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);
        let expected = compute_age(
            NaiveDate::from_ymd_opt(2011, 8, 30).unwrap(),
            Local::now().date_naive(),
        );
        assert_eq!(occurrence.form.student.age, expected);
    }

    #[test]
    fn create_prepends_newest_first() {
        let (mut service, _dir) = create_test_service();
        let first = create_record(&mut service);
        let second = create_record(&mut service);
        let ids: Vec<&str> = service.list().iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn create_rejects_invalid_form_without_mutation() {
        let (mut service, _dir) = create_test_service();
        let err = service
            .create(CreateOccurrenceCommand {
                form: OccurrenceForm::default(),
            })
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::Validation(_)));
        assert!(service.list().is_empty());
    }

    #[test]
    fn identical_update_is_a_no_op() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        let result = service
            .update(UpdateOccurrenceCommand {
                occurrence_id: occurrence.id.clone(),
                form: occurrence.form.clone(),
            })
            .unwrap();

        assert!(!result.changed);
        assert_eq!(result.occurrence.updated_at, occurrence.updated_at);
        assert_eq!(result.occurrence.audit_log.len(), 1);
    }

    #[test]
    fn real_update_appends_one_data_edit_entry_and_advances_updated_at() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        let mut form = occurrence.form.clone();
        form.location = "Biblioteca".to_string();
        let result = service
            .update(UpdateOccurrenceCommand {
                occurrence_id: occurrence.id.clone(),
                form,
            })
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.occurrence.audit_log.len(), 2);
        let entry = &result.occurrence.audit_log[1];
        assert_eq!(entry.action, AuditAction::DataEdit);
        assert_eq!(entry.details, "'Local' de 'Sala de aula' para 'Biblioteca'");
        assert!(result.occurrence.updated_at >= occurrence.updated_at);
        assert_eq!(result.occurrence.id, occurrence.id);
        assert_eq!(result.occurrence.created_at, occurrence.created_at);
    }

    #[test]
    fn update_of_missing_id_is_not_found() {
        let (mut service, _dir) = create_test_service();
        let err = service
            .update(UpdateOccurrenceCommand {
                occurrence_id: "OCC-0".to_string(),
                form: valid_form(),
            })
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::NotFound(id) if id == "OCC-0"));
    }

    #[test]
    fn set_status_to_same_value_is_suppressed() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        let result = service
            .set_status(SetStatusCommand {
                occurrence_id: occurrence.id.clone(),
                status: OccurrenceStatus::Open,
            })
            .unwrap();

        assert!(!result.changed);
        assert_eq!(result.occurrence.audit_log.len(), 1);
        assert_eq!(result.occurrence.updated_at, occurrence.updated_at);
    }

    #[test]
    fn status_transition_appends_entry_with_both_labels() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        let result = service
            .set_status(SetStatusCommand {
                occurrence_id: occurrence.id.clone(),
                status: OccurrenceStatus::InProgress,
            })
            .unwrap();

        assert!(result.changed);
        assert_eq!(result.occurrence.status, OccurrenceStatus::InProgress);
        assert_eq!(result.occurrence.audit_log.len(), 2);
        let entry = &result.occurrence.audit_log[1];
        assert_eq!(entry.action, AuditAction::StatusUpdate);
        assert_eq!(entry.details, "Status alterado de 'Aberta' para 'Em Andamento'.");
    }

    #[test]
    fn any_status_is_reachable_from_any_other() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        // Closed straight back to Open is allowed.
        for status in [
            OccurrenceStatus::Closed,
            OccurrenceStatus::Open,
            OccurrenceStatus::Resolved,
        ] {
            let result = service
                .set_status(SetStatusCommand {
                    occurrence_id: occurrence.id.clone(),
                    status,
                })
                .unwrap();
            assert!(result.changed);
            assert_eq!(result.occurrence.status, status);
        }
        let stored = service.get(&occurrence.id).unwrap();
        assert_eq!(stored.audit_log.len(), 4);
    }

    #[test]
    fn delete_removes_the_record_and_later_references_fail() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        service
            .delete(DeleteOccurrenceCommand {
                occurrence_id: occurrence.id.clone(),
            })
            .unwrap();
        assert!(service.list().is_empty());

        let err = service
            .set_status(SetStatusCommand {
                occurrence_id: occurrence.id.clone(),
                status: OccurrenceStatus::Closed,
            })
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::NotFound(_)));

        let err = service
            .delete(DeleteOccurrenceCommand {
                occurrence_id: occurrence.id,
            })
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::NotFound(_)));
    }

    #[test]
    fn replace_all_rejects_duplicate_ids_and_keeps_existing_data() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        let mut twin = occurrence.clone();
        twin.form.location = "Outro local".to_string();
        let err = service
            .replace_all(vec![occurrence.clone(), twin])
            .unwrap_err();
        assert!(matches!(err, OccurrenceError::Structural(_)));

        // Existing collection untouched.
        assert_eq!(service.list().len(), 1);
        assert_eq!(service.list()[0].form.location, "Sala de aula");
    }

    #[test]
    fn replace_all_swaps_the_whole_collection() {
        let (mut service, _dir) = create_test_service();
        create_record(&mut service);

        let replacement = seed::seed_occurrences();
        let result = service.replace_all(replacement.clone()).unwrap();
        assert_eq!(result.record_count, replacement.len());
        assert_eq!(service.list(), replacement.as_slice());
    }

    #[test]
    fn search_matches_name_description_and_id() {
        let (mut service, _dir) = create_test_service();
        let occurrence = create_record(&mut service);

        assert_eq!(service.search("rafael").len(), 1);
        assert_eq!(service.search("CARTEIRA").len(), 1);
        assert_eq!(service.search(&occurrence.id).len(), 1);
        assert!(service.search("inexistente").is_empty());
    }

    #[test]
    fn status_summary_counts_by_status() {
        let (mut service, _dir) = create_test_service();
        let first = create_record(&mut service);
        create_record(&mut service);
        service
            .set_status(SetStatusCommand {
                occurrence_id: first.id,
                status: OccurrenceStatus::Resolved,
            })
            .unwrap();

        let summary = service.status_summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.open, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.in_progress, 0);
        assert_eq!(summary.closed, 0);
    }

    #[test]
    fn load_falls_back_to_seed_when_store_is_empty_or_unreadable() {
        struct EmptyStore;
        impl OccurrenceStore for EmptyStore {
            fn load_all(&self) -> anyhow::Result<Option<Vec<Occurrence>>> {
                Ok(None)
            }
            fn save_all(&self, _: &[Occurrence]) -> anyhow::Result<()> {
                Ok(())
            }
        }
        struct BrokenStore;
        impl OccurrenceStore for BrokenStore {
            fn load_all(&self) -> anyhow::Result<Option<Vec<Occurrence>>> {
                Err(anyhow!("disk on fire"))
            }
            fn save_all(&self, _: &[Occurrence]) -> anyhow::Result<()> {
                Ok(())
            }
        }

        let seeded = OccurrenceService::load(Arc::new(EmptyStore));
        assert_eq!(seeded.list().len(), seed::seed_occurrences().len());

        let recovered = OccurrenceService::load(Arc::new(BrokenStore));
        assert_eq!(recovered.list().len(), seed::seed_occurrences().len());
    }

    #[test]
    fn failed_persistence_warns_but_keeps_the_mutation() {
        struct ReadOnlyStore;
        impl OccurrenceStore for ReadOnlyStore {
            fn load_all(&self) -> anyhow::Result<Option<Vec<Occurrence>>> {
                Ok(Some(Vec::new()))
            }
            fn save_all(&self, _: &[Occurrence]) -> anyhow::Result<()> {
                Err(anyhow!("quota exceeded"))
            }
        }

        let mut service = OccurrenceService::load(Arc::new(ReadOnlyStore));
        let result = service
            .create(CreateOccurrenceCommand { form: valid_form() })
            .unwrap();
        assert!(result.persistence_warning.is_some());
        assert_eq!(service.list().len(), 1);
    }

    #[test]
    fn collection_survives_reload_through_the_json_store() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let connection = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        let created = {
            let repository = Arc::new(OccurrenceRepository::new(connection.clone()));
            let mut service = OccurrenceService::load(repository);
            service.replace_all(Vec::new()).unwrap();
            create_record(&mut service)
        };

        let repository = Arc::new(OccurrenceRepository::new(connection));
        let reloaded = OccurrenceService::load(repository);
        assert_eq!(reloaded.list().len(), 1);
        assert_eq!(reloaded.list()[0], created);
    }
}
