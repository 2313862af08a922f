//! Shared types for the school occurrence registry.
//!
//! Everything that crosses the boundary between the domain layer and a UI
//! lives here: the occurrence record and its sub-entities, the audit trail
//! types, the structured validation error map, and the report/backup DTOs.
//!
//! Serialization notes:
//! - Field names are camelCase and enum values are the pt-BR display labels,
//!   so backups produced by earlier versions of the application restore
//!   without any migration step.
//! - Times are serialized as `"HH:MM"` (see [`time_hm`]).

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// User attributed to audit entries while the app has no real identity source.
pub const SYSTEM_USER: &str = "Sistema";

/// Triage state of an occurrence record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccurrenceStatus {
    #[serde(rename = "Aberta")]
    Open,
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Resolvida")]
    Resolved,
    #[serde(rename = "Fechada")]
    Closed,
}

impl OccurrenceStatus {
    pub const ALL: [OccurrenceStatus; 4] = [
        OccurrenceStatus::Open,
        OccurrenceStatus::InProgress,
        OccurrenceStatus::Resolved,
        OccurrenceStatus::Closed,
    ];

    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            OccurrenceStatus::Open => "Aberta",
            OccurrenceStatus::InProgress => "Em Andamento",
            OccurrenceStatus::Resolved => "Resolvida",
            OccurrenceStatus::Closed => "Fechada",
        }
    }
}

impl fmt::Display for OccurrenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of a registered incident. A record carries one or more of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OccurrenceType {
    #[serde(rename = "Agressão física")]
    PhysicalAggression,
    #[serde(rename = "Agressão verbal/ofensas")]
    VerbalAggression,
    #[serde(rename = "Situação de bullying")]
    Bullying,
    #[serde(rename = "Danos ao patrimônio")]
    PropertyDamage,
    #[serde(rename = "Fuga/abandono de sala ou unidade escolar")]
    Escape,
    #[serde(rename = "Situação de risco/vulnerabilidade social")]
    SocialRisk,
    #[serde(rename = "Uso/porte de substâncias proibidas")]
    ProhibitedSubstances,
    #[serde(rename = "Outros")]
    Other,
}

impl OccurrenceType {
    pub const ALL: [OccurrenceType; 8] = [
        OccurrenceType::PhysicalAggression,
        OccurrenceType::VerbalAggression,
        OccurrenceType::Bullying,
        OccurrenceType::PropertyDamage,
        OccurrenceType::Escape,
        OccurrenceType::SocialRisk,
        OccurrenceType::ProhibitedSubstances,
        OccurrenceType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OccurrenceType::PhysicalAggression => "Agressão física",
            OccurrenceType::VerbalAggression => "Agressão verbal/ofensas",
            OccurrenceType::Bullying => "Situação de bullying",
            OccurrenceType::PropertyDamage => "Danos ao patrimônio",
            OccurrenceType::Escape => "Fuga/abandono de sala ou unidade escolar",
            OccurrenceType::SocialRisk => "Situação de risco/vulnerabilidade social",
            OccurrenceType::ProhibitedSubstances => "Uso/porte de substâncias proibidas",
            OccurrenceType::Other => "Outros",
        }
    }
}

impl fmt::Display for OccurrenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What kind of event an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    #[serde(rename = "Criação da Ficha")]
    Creation,
    #[serde(rename = "Edição de Dados")]
    DataEdit,
    #[serde(rename = "Atualização de Status")]
    StatusUpdate,
}

impl AuditAction {
    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::Creation => "Criação da Ficha",
            AuditAction::DataEdit => "Edição de Dados",
            AuditAction::StatusUpdate => "Atualização de Status",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One immutable line of a record's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    /// Set once at creation, never edited.
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub action: AuditAction,
    pub details: String,
}

impl AuditEntry {
    /// Create a new entry stamped with the current time and the system user.
    pub fn new(action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            id: format!("audit-{}", Uuid::new_v4()),
            timestamp: Utc::now(),
            user: SYSTEM_USER.to_string(),
            action,
            details: details.into(),
        }
    }
}

/// The student an occurrence refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub full_name: String,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Derived from `birth_date`; recomputed whenever the birth date is set.
    #[serde(default)]
    pub age: u32,
    pub grade: String,
    pub shift: String,
    #[serde(default)]
    pub enrollment_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// The student's legal guardian.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardian {
    pub full_name: String,
    #[serde(default)]
    pub relationship: String,
    pub phone: String,
    pub address: String,
}

/// Everything the form collects for an occurrence. System-assigned fields
/// (id, status, timestamps, audit trail) live on [`Occurrence`] instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceForm {
    pub school_unit: String,
    #[serde(default)]
    pub municipality: String,
    #[serde(default)]
    pub uf: String,
    #[serde(default)]
    pub filling_date: Option<NaiveDate>,
    #[serde(default, with = "time_hm")]
    pub filling_time: Option<NaiveTime>,
    pub student: Student,
    pub guardian: Guardian,
    #[serde(default)]
    pub occurrence_date: Option<NaiveDate>,
    #[serde(default, with = "time_hm")]
    pub occurrence_time: Option<NaiveTime>,
    pub location: String,
    #[serde(default)]
    pub occurrence_types: Vec<OccurrenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_occurrence_type: Option<String>,
    pub detailed_description: String,
    pub involved_people: String,
    pub immediate_actions: String,
    #[serde(default)]
    pub referrals: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_service_evaluation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observations: Option<String>,
}

/// One incident report record, the aggregate root of the whole system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Immutable once assigned, unique within the collection.
    pub id: String,
    #[serde(flatten)]
    pub form: OccurrenceForm,
    pub status: OccurrenceStatus,
    pub created_at: DateTime<Utc>,
    /// Advances only when an audit entry is appended.
    pub updated_at: DateTime<Utc>,
    /// Append-only; insertion order is chronological order.
    #[serde(default)]
    pub audit_log: Vec<AuditEntry>,
}

/// Age in whole years at `today`, by calendar components (no instant math).
pub fn compute_age(birth_date: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

/// Field-level errors for the student sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
}

impl StudentErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.birth_date.is_none()
            && self.grade.is_none()
            && self.shift.is_none()
    }
}

/// Field-level errors for the guardian sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardianErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl GuardianErrors {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Structured error map produced by validation. Empty map means valid.
///
/// Errors are data, not exceptions: the UI renders each message next to the
/// offending field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_unit: Option<String>,
    #[serde(default, skip_serializing_if = "StudentErrors::is_empty")]
    pub student: StudentErrors,
    #[serde(default, skip_serializing_if = "GuardianErrors::is_empty")]
    pub guardian: GuardianErrors,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occurrence_types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_occurrence_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involved_people: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immediate_actions: Option<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.school_unit.is_none()
            && self.student.is_empty()
            && self.guardian.is_empty()
            && self.occurrence_date.is_none()
            && self.occurrence_time.is_none()
            && self.location.is_none()
            && self.occurrence_types.is_none()
            && self.other_occurrence_type.is_none()
            && self.detailed_description.is_none()
            && self.involved_people.is_none()
            && self.immediate_actions.is_none()
    }

    /// Dotted paths of every field that carries an error, for logging and
    /// for asserting subset relations between step and full validation.
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.school_unit.is_some() {
            paths.push("schoolUnit");
        }
        if self.student.full_name.is_some() {
            paths.push("student.fullName");
        }
        if self.student.birth_date.is_some() {
            paths.push("student.birthDate");
        }
        if self.student.grade.is_some() {
            paths.push("student.grade");
        }
        if self.student.shift.is_some() {
            paths.push("student.shift");
        }
        if self.guardian.full_name.is_some() {
            paths.push("guardian.fullName");
        }
        if self.guardian.phone.is_some() {
            paths.push("guardian.phone");
        }
        if self.guardian.address.is_some() {
            paths.push("guardian.address");
        }
        if self.occurrence_date.is_some() {
            paths.push("occurrenceDate");
        }
        if self.occurrence_time.is_some() {
            paths.push("occurrenceTime");
        }
        if self.location.is_some() {
            paths.push("location");
        }
        if self.occurrence_types.is_some() {
            paths.push("occurrenceTypes");
        }
        if self.other_occurrence_type.is_some() {
            paths.push("otherOccurrenceType");
        }
        if self.detailed_description.is_some() {
            paths.push("detailedDescription");
        }
        if self.involved_people.is_some() {
            paths.push("involvedPeople");
        }
        if self.immediate_actions.is_some() {
            paths.push("immediateActions");
        }
        paths
    }
}

/// Logical grouping of form fields, used by the multi-step form to gate
/// forward navigation without demanding the whole form be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStep {
    /// School unit and student identification.
    Identification,
    /// Guardian data plus the facts of the occurrence.
    GuardianAndFacts,
    /// Free-text narrative fields.
    Narrative,
    /// Optional fields only; nothing gates progression.
    Finalization,
}

/// Grouping key for tabular reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportGroupBy {
    Status,
    SchoolUnit,
    OccurrenceDate,
    MainOccurrenceType,
    StudentName,
}

/// A rendered report: header labels plus one row of cells per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One section of a grouped report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGroup {
    pub label: String,
    pub rows: Vec<Vec<String>>,
}

/// A report partitioned by a [`ReportGroupBy`] key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedReportTable {
    pub columns: Vec<String>,
    pub groups: Vec<ReportGroup>,
}

/// CSV export payload handed to the UI for saving/downloading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
    pub record_count: usize,
}

/// Backup file payload (pretty JSON of the whole collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub filename: String,
    pub content: String,
    pub record_count: usize,
}

/// Per-status record counts for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

/// Serde helper for `Option<NaiveTime>` as `"HH:MM"`.
///
/// Deserialization also accepts `"HH:MM:SS"` and treats an empty string or
/// null as absent, so form payloads and old backups both load.
pub mod time_hm {
    use chrono::NaiveTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(t) => serializer.serialize_str(&t.format("%H:%M").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveTime::parse_from_str(s, "%H:%M")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
