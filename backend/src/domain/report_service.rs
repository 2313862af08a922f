//! Tabular report generation for the export boundary.
//!
//! Produces the table model (header labels plus string cells) that the
//! PDF/spreadsheet writers render, optional grouping by a report key, a
//! ready-to-save CSV payload, and the print-readiness gate for
//! single-record export. Actual document rendering stays outside the
//! domain layer.

use chrono::{Local, NaiveDate};
use log::{info, warn};
use shared::{
    CsvExport, GroupedReportTable, Occurrence, OccurrenceType, ReportGroup, ReportGroupBy,
    ReportTable,
};
use std::collections::BTreeMap;

use crate::domain::errors::OccurrenceError;

/// One selectable report column: a stable key the UI refers to, the header
/// label, and how to render the cell.
pub struct ReportColumn {
    pub key: &'static str,
    pub label: &'static str,
    extract: fn(&Occurrence) -> String,
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

/// Every column the export dialog can offer, in render order.
pub static REPORT_COLUMNS: &[ReportColumn] = &[
    ReportColumn {
        key: "id",
        label: "ID Ocorrência",
        extract: |o| o.id.clone(),
    },
    ReportColumn {
        key: "status",
        label: "Status",
        extract: |o| o.status.label().to_string(),
    },
    ReportColumn {
        key: "schoolUnit",
        label: "Unidade Escolar",
        extract: |o| o.form.school_unit.clone(),
    },
    ReportColumn {
        key: "fillingDate",
        label: "Data Preenchimento",
        extract: |o| format_date(o.form.filling_date),
    },
    ReportColumn {
        key: "student.fullName",
        label: "Nome do Aluno",
        extract: |o| o.form.student.full_name.clone(),
    },
    ReportColumn {
        key: "student.birthDate",
        label: "Data Nasc. Aluno",
        extract: |o| format_date(o.form.student.birth_date),
    },
    ReportColumn {
        key: "student.age",
        label: "Idade Aluno",
        extract: |o| o.form.student.age.to_string(),
    },
    ReportColumn {
        key: "student.grade",
        label: "Ano/Série",
        extract: |o| o.form.student.grade.clone(),
    },
    ReportColumn {
        key: "student.shift",
        label: "Turno",
        extract: |o| o.form.student.shift.clone(),
    },
    ReportColumn {
        key: "guardian.fullName",
        label: "Responsável",
        extract: |o| o.form.guardian.full_name.clone(),
    },
    ReportColumn {
        key: "guardian.phone",
        label: "Telefone Resp.",
        extract: |o| o.form.guardian.phone.clone(),
    },
    ReportColumn {
        key: "occurrenceDate",
        label: "Data Ocorrência",
        extract: |o| format_date(o.form.occurrence_date),
    },
    ReportColumn {
        key: "occurrenceTime",
        label: "Hora Ocorrência",
        extract: |o| {
            o.form
                .occurrence_time
                .map(|t| t.format("%H:%M").to_string())
                .unwrap_or_default()
        },
    },
    ReportColumn {
        key: "location",
        label: "Local",
        extract: |o| o.form.location.clone(),
    },
    ReportColumn {
        key: "occurrenceTypes",
        label: "Tipos de Ocorrência",
        extract: |o| {
            o.form
                .occurrence_types
                .iter()
                .map(OccurrenceType::label)
                .collect::<Vec<_>>()
                .join("; ")
        },
    },
    ReportColumn {
        key: "otherOccurrenceType",
        label: "Outro Tipo (Detalhe)",
        extract: |o| {
            if o.form.occurrence_types.contains(&OccurrenceType::Other) {
                o.form.other_occurrence_type.clone().unwrap_or_default()
            } else {
                "N/A".to_string()
            }
        },
    },
    ReportColumn {
        key: "detailedDescription",
        label: "Descrição Detalhada",
        extract: |o| o.form.detailed_description.clone(),
    },
    ReportColumn {
        key: "involvedPeople",
        label: "Pessoas Envolvidas",
        extract: |o| o.form.involved_people.clone(),
    },
    ReportColumn {
        key: "immediateActions",
        label: "Providências Imediatas",
        extract: |o| o.form.immediate_actions.clone(),
    },
    ReportColumn {
        key: "referrals",
        label: "Encaminhamentos",
        extract: |o| o.form.referrals.clone(),
    },
    ReportColumn {
        key: "socialServiceEvaluation",
        label: "Avaliação Serviço Social",
        extract: |o| o.form.social_service_evaluation.clone().unwrap_or_default(),
    },
    ReportColumn {
        key: "createdAt",
        label: "Registrado em",
        extract: |o| {
            o.created_at
                .with_timezone(&Local)
                .format("%d/%m/%Y %H:%M")
                .to_string()
        },
    },
    ReportColumn {
        key: "updatedAt",
        label: "Atualizado em",
        extract: |o| {
            o.updated_at
                .with_timezone(&Local)
                .format("%d/%m/%Y %H:%M")
                .to_string()
        },
    },
];

/// Fields a single-record print refuses to render without, as
/// (check, label) pairs. Overlaps with form validation on purpose but is a
/// separate presentation gate.
static PRINT_REQUIRED: &[(&str, fn(&Occurrence) -> bool)] = &[
    ("Unidade Escolar", |o| !o.form.school_unit.trim().is_empty()),
    ("Nome do Aluno", |o| !o.form.student.full_name.trim().is_empty()),
    ("Data de Nascimento", |o| o.form.student.birth_date.is_some()),
    ("Ano/Série", |o| !o.form.student.grade.trim().is_empty()),
    ("Turno", |o| !o.form.student.shift.trim().is_empty()),
    ("Nome do Responsável", |o| {
        !o.form.guardian.full_name.trim().is_empty()
    }),
    ("Contato Telefônico", |o| !o.form.guardian.phone.trim().is_empty()),
    ("Endereço", |o| !o.form.guardian.address.trim().is_empty()),
    ("Data da Ocorrência", |o| o.form.occurrence_date.is_some()),
    ("Hora da Ocorrência", |o| o.form.occurrence_time.is_some()),
    ("Local", |o| !o.form.location.trim().is_empty()),
    ("Tipos de Ocorrência", |o| !o.form.occurrence_types.is_empty()),
    ("Descrição Detalhada", |o| {
        !o.form.detailed_description.trim().is_empty()
    }),
    ("Pessoas Envolvidas", |o| !o.form.involved_people.trim().is_empty()),
    ("Providências Imediatas", |o| {
        !o.form.immediate_actions.trim().is_empty()
    }),
];

#[derive(Clone, Default)]
pub struct ReportService;

impl ReportService {
    pub fn new() -> Self {
        Self
    }

    /// (key, label) pairs for the column picker.
    pub fn available_columns(&self) -> Vec<(&'static str, &'static str)> {
        REPORT_COLUMNS.iter().map(|c| (c.key, c.label)).collect()
    }

    /// Render the selected columns for each record. Selection is matched by
    /// key; canonical column order is kept regardless of selection order,
    /// and unknown keys are ignored.
    pub fn tabulate(&self, occurrences: &[Occurrence], selected_keys: &[&str]) -> ReportTable {
        let columns = self.resolve_columns(selected_keys);
        ReportTable {
            columns: columns.iter().map(|c| c.label.to_string()).collect(),
            rows: occurrences
                .iter()
                .map(|o| columns.iter().map(|c| (c.extract)(o)).collect())
                .collect(),
        }
    }

    /// Like [`tabulate`](Self::tabulate), partitioned by a grouping key.
    /// Groups come out sorted by label.
    pub fn tabulate_grouped(
        &self,
        occurrences: &[Occurrence],
        selected_keys: &[&str],
        group_by: ReportGroupBy,
    ) -> GroupedReportTable {
        let columns = self.resolve_columns(selected_keys);
        let mut groups: BTreeMap<String, Vec<Vec<String>>> = BTreeMap::new();
        for occurrence in occurrences {
            let row = columns.iter().map(|c| (c.extract)(occurrence)).collect();
            groups
                .entry(group_label(occurrence, group_by))
                .or_default()
                .push(row);
        }
        GroupedReportTable {
            columns: columns.iter().map(|c| c.label.to_string()).collect(),
            groups: groups
                .into_iter()
                .map(|(label, rows)| ReportGroup { label, rows })
                .collect(),
        }
    }

    /// CSV payload with a dated filename, quote-escaped like the rest of
    /// our exports.
    pub fn csv(&self, occurrences: &[Occurrence], selected_keys: &[&str]) -> CsvExport {
        let table = self.tabulate(occurrences, selected_keys);
        let mut content = String::new();
        content.push_str(&csv_line(&table.columns));
        for row in &table.rows {
            content.push_str(&csv_line(row));
        }

        let filename = format!(
            "relatorio_ocorrencias_{}.csv",
            Local::now().format("%Y%m%d")
        );
        info!(
            "generated CSV report {} with {} rows",
            filename,
            table.rows.len()
        );
        CsvExport {
            filename,
            content,
            record_count: table.rows.len(),
        }
    }

    /// Gate for single-record export: refuses to render with any required
    /// field missing, naming every one of them.
    pub fn print_readiness(&self, occurrence: &Occurrence) -> Result<(), OccurrenceError> {
        let missing: Vec<String> = PRINT_REQUIRED
            .iter()
            .filter(|(_, present)| !present(occurrence))
            .map(|(label, _)| label.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(OccurrenceError::PrintReadiness { missing })
        }
    }

    fn resolve_columns(&self, selected_keys: &[&str]) -> Vec<&'static ReportColumn> {
        for key in selected_keys {
            if !REPORT_COLUMNS.iter().any(|c| c.key == *key) {
                warn!("unknown report column key ignored: {key}");
            }
        }
        REPORT_COLUMNS
            .iter()
            .filter(|c| selected_keys.contains(&c.key))
            .collect()
    }
}

fn group_label(occurrence: &Occurrence, group_by: ReportGroupBy) -> String {
    match group_by {
        ReportGroupBy::Status => occurrence.status.label().to_string(),
        ReportGroupBy::SchoolUnit => occurrence.form.school_unit.clone(),
        ReportGroupBy::OccurrenceDate => occurrence
            .form
            .occurrence_date
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| "Sem data".to_string()),
        ReportGroupBy::MainOccurrenceType => occurrence
            .form
            .occurrence_types
            .first()
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| "N/A".to_string()),
        ReportGroupBy::StudentName => occurrence.form.student.full_name.clone(),
    }
}

fn csv_line(cells: &[String]) -> String {
    let quoted: Vec<String> = cells
        .iter()
        .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
        .collect();
    format!("{}\n", quoted.join(","))
}
