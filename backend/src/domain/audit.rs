//! Change detection and audit-trail summaries.
//!
//! Compares two record snapshots field by field and produces the compact,
//! human-readable description stored in a `Edição de Dados` audit entry.
//! The comparison is driven by a fixed table of tracked fields, so adding a
//! field to the trail means adding one row here.

use chrono::NaiveDate;
use shared::{Occurrence, OccurrenceType};

/// Details text of the single entry written at creation.
pub const CREATION_DETAILS: &str = "Ficha de ocorrência registrada no sistema.";

/// Old values longer than this are not quoted in the trail.
const LONG_TEXT_THRESHOLD: usize = 50;

/// Shown in place of a blank old/new value.
const EMPTY_DISPLAY: &str = "vazio";

/// Typed snapshot of one tracked field, extracted for comparison.
enum FieldValue {
    Text(String),
    Date(Option<NaiveDate>),
    TypeSet(Vec<OccurrenceType>),
}

impl FieldValue {
    /// Normalized display form used both for comparison and for the trail.
    ///
    /// Dates collapse to `YYYY-MM-DD` (time-of-day and timezone never leak
    /// into the diff), type sets are sorted so reordering is not a change,
    /// and plain text is trimmed.
    fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.trim().to_string(),
            FieldValue::Date(d) => d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            FieldValue::TypeSet(types) => {
                let mut labels: Vec<&str> = types.iter().map(OccurrenceType::label).collect();
                labels.sort_unstable();
                labels.join(", ")
            }
        }
    }

    /// Length of the raw old value, for the long-text cutoff.
    fn raw_len(&self) -> usize {
        match self {
            FieldValue::Text(s) => s.chars().count(),
            _ => 0,
        }
    }
}

struct TrackedField {
    label: &'static str,
    extract: fn(&Occurrence) -> FieldValue,
}

/// Every editable field, in the order changes are reported.
static TRACKED_FIELDS: &[TrackedField] = &[
    TrackedField {
        label: "Unidade Escolar",
        extract: |o| FieldValue::Text(o.form.school_unit.clone()),
    },
    TrackedField {
        label: "Município",
        extract: |o| FieldValue::Text(o.form.municipality.clone()),
    },
    TrackedField {
        label: "UF",
        extract: |o| FieldValue::Text(o.form.uf.clone()),
    },
    TrackedField {
        label: "Data de Preenchimento",
        extract: |o| FieldValue::Date(o.form.filling_date),
    },
    TrackedField {
        label: "Horário de Preenchimento",
        extract: |o| {
            FieldValue::Text(
                o.form
                    .filling_time
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_default(),
            )
        },
    },
    TrackedField {
        label: "Nome do Aluno",
        extract: |o| FieldValue::Text(o.form.student.full_name.clone()),
    },
    TrackedField {
        label: "Data de Nascimento",
        extract: |o| FieldValue::Date(o.form.student.birth_date),
    },
    TrackedField {
        label: "Idade",
        extract: |o| FieldValue::Text(o.form.student.age.to_string()),
    },
    TrackedField {
        label: "Ano/Série",
        extract: |o| FieldValue::Text(o.form.student.grade.clone()),
    },
    TrackedField {
        label: "Turno",
        extract: |o| FieldValue::Text(o.form.student.shift.clone()),
    },
    TrackedField {
        label: "Nº de Matrícula",
        extract: |o| FieldValue::Text(o.form.student.enrollment_id.clone()),
    },
    TrackedField {
        label: "Nome do Responsável",
        extract: |o| FieldValue::Text(o.form.guardian.full_name.clone()),
    },
    TrackedField {
        label: "Parentesco",
        extract: |o| FieldValue::Text(o.form.guardian.relationship.clone()),
    },
    TrackedField {
        label: "Contato Telefônico",
        extract: |o| FieldValue::Text(o.form.guardian.phone.clone()),
    },
    TrackedField {
        label: "Endereço",
        extract: |o| FieldValue::Text(o.form.guardian.address.clone()),
    },
    TrackedField {
        label: "Data da Ocorrência",
        extract: |o| FieldValue::Date(o.form.occurrence_date),
    },
    TrackedField {
        label: "Hora da Ocorrência",
        extract: |o| {
            FieldValue::Text(
                o.form
                    .occurrence_time
                    .map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_default(),
            )
        },
    },
    TrackedField {
        label: "Local",
        extract: |o| FieldValue::Text(o.form.location.clone()),
    },
    TrackedField {
        label: "Tipos de Ocorrência",
        extract: |o| FieldValue::TypeSet(o.form.occurrence_types.clone()),
    },
    TrackedField {
        label: "Outro Tipo (Detalhe)",
        extract: |o| {
            FieldValue::Text(o.form.other_occurrence_type.clone().unwrap_or_default())
        },
    },
    TrackedField {
        label: "Descrição Detalhada",
        extract: |o| FieldValue::Text(o.form.detailed_description.clone()),
    },
    TrackedField {
        label: "Pessoas Envolvidas",
        extract: |o| FieldValue::Text(o.form.involved_people.clone()),
    },
    TrackedField {
        label: "Providências Imediatas",
        extract: |o| FieldValue::Text(o.form.immediate_actions.clone()),
    },
    TrackedField {
        label: "Encaminhamentos",
        extract: |o| FieldValue::Text(o.form.referrals.clone()),
    },
    TrackedField {
        label: "Avaliação Serviço Social",
        extract: |o| {
            FieldValue::Text(o.form.social_service_evaluation.clone().unwrap_or_default())
        },
    },
    TrackedField {
        label: "Observações",
        extract: |o| FieldValue::Text(o.form.observations.clone().unwrap_or_default()),
    },
    TrackedField {
        label: "Status",
        extract: |o| FieldValue::Text(o.status.label().to_string()),
    },
];

/// Human-readable summary of what changed between two snapshots.
///
/// Empty string means no meaningful change; the caller must then neither
/// append an audit entry nor bump `updated_at`.
pub fn summarize_changes(old: &Occurrence, updated: &Occurrence) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for field in TRACKED_FIELDS {
        let old_value = (field.extract)(old);
        let new_value = (field.extract)(updated);
        let old_display = old_value.display();
        let new_display = new_value.display();
        if old_display == new_display {
            continue;
        }

        if old_value.raw_len() > LONG_TEXT_THRESHOLD {
            fragments.push(format!("Campo '{}' foi modificado.", field.label));
        } else {
            fragments.push(format!(
                "'{}' de '{}' para '{}'",
                field.label,
                non_empty(&old_display),
                non_empty(&new_display),
            ));
        }
    }

    fragments.join("; ")
}

fn non_empty(value: &str) -> &str {
    if value.is_empty() {
        EMPTY_DISPLAY
    } else {
        value
    }
}

/// Details text for a status transition entry.
pub fn status_change_details(
    old: shared::OccurrenceStatus,
    new: shared::OccurrenceStatus,
) -> String {
    format!("Status alterado de '{}' para '{}'.", old.label(), new.label())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use shared::{Guardian, OccurrenceForm, OccurrenceStatus, Student};

    fn sample() -> Occurrence {
        Occurrence {
            id: "OCC-1700000000000".to_string(),
            form: OccurrenceForm {
                school_unit: "Colégio Estadual de Itaberaba".to_string(),
                student: Student {
                    full_name: "Ana Clara Lima".to_string(),
                    birth_date: NaiveDate::from_ymd_opt(2012, 9, 2),
                    age: 13,
                    grade: "8º Ano".to_string(),
                    shift: "Vespertino".to_string(),
                    ..Default::default()
                },
                guardian: Guardian {
                    full_name: "Carlos Lima".to_string(),
                    phone: "(75) 98888-7777".to_string(),
                    address: "Avenida Rio Branco, 45".to_string(),
                    ..Default::default()
                },
                occurrence_date: NaiveDate::from_ymd_opt(2026, 2, 3),
                location: "Sala 12".to_string(),
                occurrence_types: vec![
                    OccurrenceType::Bullying,
                    OccurrenceType::VerbalAggression,
                ],
                detailed_description: "Apelidos ofensivos repetidos em sala.".to_string(),
                involved_people: "Ana Clara e dois colegas".to_string(),
                immediate_actions: "Alunos encaminhados à coordenação.".to_string(),
                ..Default::default()
            },
            status: OccurrenceStatus::Open,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            audit_log: vec![],
        }
    }

    #[test]
    fn identical_records_produce_empty_summary() {
        let record = sample();
        assert_eq!(summarize_changes(&record, &record), "");
    }

    #[test]
    fn single_scalar_change_produces_one_labeled_fragment() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.location = "Quadra de esportes".to_string();
        let summary = summarize_changes(&old, &updated);
        assert_eq!(summary, "'Local' de 'Sala 12' para 'Quadra de esportes'");
    }

    #[test]
    fn reordering_occurrence_types_is_not_a_change() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.occurrence_types =
            vec![OccurrenceType::VerbalAggression, OccurrenceType::Bullying];
        assert_eq!(summarize_changes(&old, &updated), "");
    }

    #[test]
    fn adding_a_type_reports_the_sorted_sets() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.occurrence_types.push(OccurrenceType::PropertyDamage);
        let summary = summarize_changes(&old, &updated);
        assert!(summary.starts_with("'Tipos de Ocorrência' de '"));
        assert!(summary.contains("Danos ao patrimônio"));
    }

    #[test]
    fn long_old_text_is_not_quoted_in_the_trail() {
        let mut old = sample();
        old.form.detailed_description =
            "Relato extenso da ocorrência com mais de cinquenta caracteres no total."
                .to_string();
        let mut updated = old.clone();
        updated.form.detailed_description = "Texto novo suficiente.".to_string();
        let summary = summarize_changes(&old, &updated);
        assert_eq!(summary, "Campo 'Descrição Detalhada' foi modificado.");
    }

    #[test]
    fn blank_values_display_as_vazio() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.referrals = "Conselho Tutelar".to_string();
        let summary = summarize_changes(&old, &updated);
        assert_eq!(summary, "'Encaminhamentos' de 'vazio' para 'Conselho Tutelar'");
    }

    #[test]
    fn multiple_changes_join_with_semicolon() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.location = "Refeitório".to_string();
        updated.form.student.grade = "9º Ano".to_string();
        let summary = summarize_changes(&old, &updated);
        let fragments: Vec<&str> = summary.split("; ").collect();
        assert_eq!(fragments.len(), 2);
        // Table order: student fields come before occurrence facts.
        assert!(fragments[0].contains("Ano/Série"));
        assert!(fragments[1].contains("Local"));
    }

    #[test]
    fn date_comparison_ignores_nothing_but_the_calendar_day() {
        let old = sample();
        let mut updated = old.clone();
        updated.form.occurrence_date = NaiveDate::from_ymd_opt(2026, 2, 4);
        let summary = summarize_changes(&old, &updated);
        assert_eq!(
            summary,
            "'Data da Ocorrência' de '2026-02-03' para '2026-02-04'"
        );
    }

    #[test]
    fn status_change_details_quotes_both_labels() {
        assert_eq!(
            status_change_details(OccurrenceStatus::Open, OccurrenceStatus::InProgress),
            "Status alterado de 'Aberta' para 'Em Andamento'."
        );
    }
}
