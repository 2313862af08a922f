//! Record validation for occurrence forms.
//!
//! Pure functions: a candidate form goes in, a structured error map comes
//! out. Empty map means valid. Date and time rules compare calendar
//! components (year/month/day, hour/minute) instead of serialized instants,
//! so a timezone offset can never turn a valid "today" into "tomorrow".

use chrono::{Local, NaiveDateTime, Timelike};
use log::debug;
use shared::{FormStep, OccurrenceForm, OccurrenceType, ValidationErrors};

/// Operating window for the occurrence time: 07:00 up to and including 22:59.
const FIRST_VALID_HOUR: u32 = 7;
const FIRST_INVALID_HOUR: u32 = 23;

const MIN_NAME_LEN: usize = 3;
const MIN_ADDRESS_LEN: usize = 10;
const MIN_DESCRIPTION_LEN: usize = 10;

/// Validate a candidate form against the current wall clock.
pub fn validate(form: &OccurrenceForm) -> ValidationErrors {
    validate_with_now(form, Local::now().naive_local())
}

/// Validate against an explicit "now", so the date/time rules are
/// deterministic under test.
pub fn validate_with_now(form: &OccurrenceForm, now: NaiveDateTime) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    let today = now.date();

    if form.school_unit.trim().is_empty() {
        errors.school_unit = Some("A unidade escolar é obrigatória.".to_string());
    }

    // Student
    let student_name = form.student.full_name.trim();
    if student_name.is_empty() {
        errors.student.full_name = Some("O nome do aluno é obrigatório.".to_string());
    } else if student_name.chars().count() < MIN_NAME_LEN {
        errors.student.full_name = Some("O nome deve ter pelo menos 3 caracteres.".to_string());
    }

    match form.student.birth_date {
        None => {
            errors.student.birth_date = Some("A data de nascimento é obrigatória.".to_string());
        }
        Some(birth) if birth > today => {
            errors.student.birth_date =
                Some("A data de nascimento deve ser no passado.".to_string());
        }
        Some(_) => {}
    }

    if form.student.grade.trim().is_empty() {
        errors.student.grade = Some("O ano/série é obrigatório.".to_string());
    }
    if form.student.shift.trim().is_empty() {
        errors.student.shift = Some("O turno é obrigatório.".to_string());
    }

    // Guardian
    if form.guardian.full_name.trim().is_empty() {
        errors.guardian.full_name = Some("O nome do responsável é obrigatório.".to_string());
    }

    let phone = form.guardian.phone.trim();
    if phone.is_empty() {
        errors.guardian.phone = Some("O contato do responsável é obrigatório.".to_string());
    } else {
        let digits = phone.chars().filter(char::is_ascii_digit).count();
        if !(10..=11).contains(&digits) {
            errors.guardian.phone = Some(
                "Telefone inválido. O número deve ter 10 ou 11 dígitos com DDD.".to_string(),
            );
        }
    }

    let address = form.guardian.address.trim();
    if address.is_empty() {
        errors.guardian.address = Some("O endereço do responsável é obrigatório.".to_string());
    } else if address.chars().count() < MIN_ADDRESS_LEN {
        errors.guardian.address =
            Some("O endereço deve ter pelo menos 10 caracteres.".to_string());
    }

    // Occurrence facts
    match form.occurrence_date {
        None => {
            errors.occurrence_date = Some("A data da ocorrência é obrigatória.".to_string());
        }
        Some(date) => {
            if date > today {
                errors.occurrence_date =
                    Some("A data da ocorrência não pode ser no futuro.".to_string());
            }
            if let Some(birth) = form.student.birth_date {
                if date < birth {
                    errors.occurrence_date = Some(
                        "A ocorrência não pode ser anterior ao nascimento do aluno.".to_string(),
                    );
                }
            }
        }
    }

    match form.occurrence_time {
        None => {
            errors.occurrence_time = Some("O horário aproximado é obrigatório.".to_string());
        }
        Some(time) => {
            if time.hour() < FIRST_VALID_HOUR || time.hour() >= FIRST_INVALID_HOUR {
                errors.occurrence_time =
                    Some("O horário deve ser entre 07:00 e 22:59.".to_string());
            } else if errors.occurrence_date.is_none() && form.occurrence_date == Some(today) {
                // Same-day records may not be stamped later than the clock.
                let reported = (time.hour(), time.minute());
                let current = (now.hour(), now.minute());
                if reported > current {
                    errors.occurrence_time =
                        Some("O horário não pode ser futuro para o dia de hoje.".to_string());
                }
            }
        }
    }

    if form.location.trim().is_empty() {
        errors.location = Some("O local da ocorrência é obrigatório.".to_string());
    }

    if form.occurrence_types.is_empty() {
        errors.occurrence_types = Some("Selecione ao menos um tipo de ocorrência.".to_string());
    }
    let other_detail_missing = form
        .other_occurrence_type
        .as_deref()
        .map_or(true, |s| s.trim().is_empty());
    if form.occurrence_types.contains(&OccurrenceType::Other) && other_detail_missing {
        errors.other_occurrence_type = Some("Especifique o tipo 'Outros'.".to_string());
    }

    // Narrative
    let description = form.detailed_description.trim();
    if description.is_empty() {
        errors.detailed_description = Some("A descrição detalhada é obrigatória.".to_string());
    } else if description.chars().count() < MIN_DESCRIPTION_LEN {
        errors.detailed_description =
            Some("A descrição deve ter pelo menos 10 caracteres.".to_string());
    }

    if form.involved_people.trim().is_empty() {
        errors.involved_people = Some("Informar as pessoas envolvidas é obrigatório.".to_string());
    }
    if form.immediate_actions.trim().is_empty() {
        errors.immediate_actions =
            Some("Informar as providências imediatas é obrigatório.".to_string());
    }

    if !errors.is_empty() {
        debug!("validation failed on fields: {:?}", errors.field_paths());
    }
    errors
}

/// Errors relevant to one step of the multi-step form.
///
/// Always computed by filtering the full error map, never by re-stating
/// rules, so step-level and full validation cannot diverge.
pub fn validate_step(form: &OccurrenceForm, step: FormStep) -> ValidationErrors {
    validate_step_with_now(form, step, Local::now().naive_local())
}

pub fn validate_step_with_now(
    form: &OccurrenceForm,
    step: FormStep,
    now: NaiveDateTime,
) -> ValidationErrors {
    let full = validate_with_now(form, now);
    let mut errors = ValidationErrors::default();
    match step {
        FormStep::Identification => {
            errors.school_unit = full.school_unit;
            errors.student = full.student;
        }
        FormStep::GuardianAndFacts => {
            errors.guardian = full.guardian;
            errors.occurrence_date = full.occurrence_date;
            errors.occurrence_time = full.occurrence_time;
            errors.location = full.location;
            errors.occurrence_types = full.occurrence_types;
            errors.other_occurrence_type = full.other_occurrence_type;
        }
        FormStep::Narrative => {
            errors.detailed_description = full.detailed_description;
            errors.involved_people = full.involved_people;
            errors.immediate_actions = full.immediate_actions;
        }
        FormStep::Finalization => {}
    }
    errors
}
