//! Built-in seed dataset, loaded when no stored collection exists (first
//! run) or when the stored blob cannot be read.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use shared::{
    AuditAction, AuditEntry, Guardian, Occurrence, OccurrenceForm, OccurrenceStatus,
    OccurrenceType, Student, SYSTEM_USER,
};

use crate::domain::audit::CREATION_DETAILS;

fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn time(hour: u32, minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Two realistic, fully valid records so a fresh install is not an empty
/// screen.
pub fn seed_occurrences() -> Vec<Occurrence> {
    let first_created = Utc
        .with_ymd_and_hms(2025, 11, 3, 13, 12, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let second_created = Utc
        .with_ymd_and_hms(2025, 11, 17, 10, 40, 0)
        .single()
        .unwrap_or_else(Utc::now);

    vec![
        Occurrence {
            id: "OCC-1763374800000".to_string(),
            form: OccurrenceForm {
                school_unit: "Escola Municipal Cecília Meireles".to_string(),
                municipality: "Itaberaba".to_string(),
                uf: "BA".to_string(),
                filling_date: date(2025, 11, 17),
                filling_time: time(10, 40),
                student: Student {
                    full_name: "Lucas Ferreira Almeida".to_string(),
                    birth_date: date(2012, 4, 8),
                    age: 13,
                    grade: "8º Ano".to_string(),
                    shift: "Matutino".to_string(),
                    enrollment_id: "20250214".to_string(),
                    photo_url: None,
                },
                guardian: Guardian {
                    full_name: "Patrícia Ferreira Almeida".to_string(),
                    relationship: "Mãe".to_string(),
                    phone: "(75) 99871-2234".to_string(),
                    address: "Rua Barão de Cotegipe, 88, Centro".to_string(),
                },
                occurrence_date: date(2025, 11, 17),
                occurrence_time: time(9, 50),
                location: "Quadra de esportes".to_string(),
                occurrence_types: vec![OccurrenceType::PhysicalAggression],
                other_occurrence_type: None,
                detailed_description:
                    "Briga entre dois alunos durante a aula de educação física, \
                     iniciada por uma disputa de bola."
                        .to_string(),
                involved_people: "Lucas Ferreira e um colega do 8º Ano".to_string(),
                immediate_actions:
                    "Alunos separados pelo professor e levados à direção; responsáveis \
                     comunicados por telefone."
                        .to_string(),
                referrals: String::new(),
                social_service_evaluation: None,
                observations: None,
            },
            status: OccurrenceStatus::InProgress,
            created_at: second_created,
            updated_at: second_created,
            audit_log: vec![AuditEntry {
                id: "audit-seed-0002".to_string(),
                timestamp: second_created,
                user: SYSTEM_USER.to_string(),
                action: AuditAction::Creation,
                details: CREATION_DETAILS.to_string(),
            }],
        },
        Occurrence {
            id: "OCC-1762175520000".to_string(),
            form: OccurrenceForm {
                school_unit: "Colégio Estadual de Itaberaba".to_string(),
                municipality: "Itaberaba".to_string(),
                uf: "BA".to_string(),
                filling_date: date(2025, 11, 3),
                filling_time: time(13, 12),
                student: Student {
                    full_name: "Mariana Souza Oliveira".to_string(),
                    birth_date: date(2010, 12, 1),
                    age: 14,
                    grade: "1ª Série EM".to_string(),
                    shift: "Vespertino".to_string(),
                    enrollment_id: "20250077".to_string(),
                    photo_url: None,
                },
                guardian: Guardian {
                    full_name: "José Carlos Oliveira".to_string(),
                    relationship: "Pai".to_string(),
                    phone: "(75) 3251-4090".to_string(),
                    address: "Travessa São José, 17, Bairro Primavera".to_string(),
                },
                occurrence_date: date(2025, 10, 31),
                occurrence_time: time(14, 20),
                location: "Corredor do segundo andar".to_string(),
                occurrence_types: vec![
                    OccurrenceType::Bullying,
                    OccurrenceType::VerbalAggression,
                ],
                other_occurrence_type: None,
                detailed_description:
                    "Aluna relatou apelidos ofensivos e mensagens hostis de um grupo de \
                     colegas, recorrentes nas últimas semanas."
                        .to_string(),
                involved_people: "Mariana Souza e três alunas da mesma turma".to_string(),
                immediate_actions:
                    "Escuta individual da aluna e comunicação à coordenação pedagógica."
                        .to_string(),
                referrals: "Orientação educacional".to_string(),
                social_service_evaluation: None,
                observations: Some("Acompanhar nas próximas duas semanas.".to_string()),
            },
            status: OccurrenceStatus::Open,
            created_at: first_created,
            updated_at: first_created,
            audit_log: vec![AuditEntry {
                id: "audit-seed-0001".to_string(),
                timestamp: first_created,
                user: SYSTEM_USER.to_string(),
                action: AuditAction::Creation,
                details: CREATION_DETAILS.to_string(),
            }],
        },
    ]
}
