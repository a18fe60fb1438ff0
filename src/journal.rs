//! Symptom journal: logging, editing and browsing a patient's symptoms.
//!
//! Writes go through here so severity bounds and record ownership are
//! enforced in one place. The risk engine only ever reads.

use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::enums::SymptomKind;
use crate::models::symptom::MAX_SEVERITY;
use crate::models::SymptomRecord;

// ═══════════════════════════════════════════
// View types
// ═══════════════════════════════════════════

/// Input for logging one symptom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub symptom: SymptomKind,
    pub severity: u8,
    /// Defaults to today when absent.
    #[serde(default)]
    pub date_logged: Option<NaiveDate>,
}

/// All logs sharing one `date_logged`.
#[derive(Debug, Clone, Serialize)]
pub struct SymptomDay {
    pub date: NaiveDate,
    pub entries: Vec<SymptomRecord>,
}

/// One row of the symptom picker.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub label: &'static str,
    pub high_risk: bool,
}

// ═══════════════════════════════════════════
// Repository functions
// ═══════════════════════════════════════════

fn check_severity(severity: u8) -> Result<(), DatabaseError> {
    if severity > MAX_SEVERITY {
        return Err(DatabaseError::ConstraintViolation(format!(
            "Severity {severity} out of range 0..={MAX_SEVERITY}"
        )));
    }
    Ok(())
}

fn log_not_found(log_id: &Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: "SymptomLog".into(),
        id: log_id.to_string(),
    }
}

/// Logs a symptom for an existing patient. Returns the new log id.
pub fn record_symptom(
    conn: &Connection,
    patient_id: &Uuid,
    entry: &SymptomEntry,
) -> Result<Uuid, DatabaseError> {
    check_severity(entry.severity)?;
    if db::get_patient(conn, patient_id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: patient_id.to_string(),
        });
    }

    let record = SymptomRecord {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        symptom: entry.symptom,
        severity: entry.severity,
        date_logged: entry
            .date_logged
            .unwrap_or_else(|| Local::now().date_naive()),
    };
    db::insert_symptom_record(conn, &record)?;

    tracing::debug!(
        patient_id = %patient_id,
        symptom = %record.symptom,
        date = %record.date_logged,
        "Symptom logged"
    );
    Ok(record.id)
}

/// Changes the severity of one of the patient's own logs.
pub fn update_severity(
    conn: &Connection,
    patient_id: &Uuid,
    log_id: &Uuid,
    severity: u8,
) -> Result<(), DatabaseError> {
    check_severity(severity)?;
    let updated = conn.execute(
        "UPDATE symptom_logs SET severity = ?1 WHERE id = ?2 AND patient_id = ?3",
        params![severity as i32, log_id.to_string(), patient_id.to_string()],
    )?;
    if updated == 0 {
        return Err(log_not_found(log_id));
    }
    Ok(())
}

/// Hard-deletes one of the patient's own logs.
pub fn delete_symptom(
    conn: &Connection,
    patient_id: &Uuid,
    log_id: &Uuid,
) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM symptom_logs WHERE id = ?1 AND patient_id = ?2",
        params![log_id.to_string(), patient_id.to_string()],
    )?;
    if deleted == 0 {
        return Err(log_not_found(log_id));
    }
    Ok(())
}

/// Full history grouped by day, newest day first.
pub fn history_by_date(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<SymptomDay>, DatabaseError> {
    let records = db::get_symptom_records_for_patient(conn, patient_id)?;

    let mut days: Vec<SymptomDay> = Vec::new();
    for record in records {
        match days.last_mut() {
            Some(day) if day.date == record.date_logged => day.entries.push(record),
            _ => days.push(SymptomDay {
                date: record.date_logged,
                entries: vec![record],
            }),
        }
    }
    Ok(days)
}

/// The symptom catalog in display order.
pub fn symptom_catalog() -> Vec<CatalogEntry> {
    SymptomKind::ALL
        .iter()
        .map(|kind| CatalogEntry {
            key: kind.as_str(),
            label: kind.label(),
            high_risk: kind.is_high_risk(),
        })
        .collect()
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;

    fn test_db() -> Connection {
        open_memory_database().expect("in-memory DB")
    }

    fn seed_patient(conn: &Connection) -> Uuid {
        let id = Uuid::new_v4();
        db::insert_patient(
            conn,
            &Patient {
                id,
                full_name: "Journal Patient".into(),
                age: Some(28),
            },
        )
        .expect("seed patient");
        id
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn entry(symptom: SymptomKind, severity: u8, day: &str) -> SymptomEntry {
        SymptomEntry {
            symptom,
            severity,
            date_logged: Some(date(day)),
        }
    }

    fn stored_severity(conn: &Connection, log_id: &Uuid) -> i32 {
        conn.query_row(
            "SELECT severity FROM symptom_logs WHERE id = ?1",
            params![log_id.to_string()],
            |r| r.get(0),
        )
        .unwrap()
    }

    // ───────────────────────────────────────
    // record_symptom tests
    // ───────────────────────────────────────

    #[test]
    fn record_basic_symptom() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let id = record_symptom(&conn, &patient, &entry(SymptomKind::Fever, 2, "2025-06-01")).unwrap();

        let records = db::get_symptom_records_for_patient(&conn, &patient).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);
        assert_eq!(records[0].symptom, SymptomKind::Fever);
        assert_eq!(records[0].date_logged, date("2025-06-01"));
    }

    #[test]
    fn record_defaults_to_today() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let e = SymptomEntry {
            symptom: SymptomKind::Nausea,
            severity: 1,
            date_logged: None,
        };
        record_symptom(&conn, &patient, &e).unwrap();

        let records = db::get_symptom_records_for_patient(&conn, &patient).unwrap();
        assert_eq!(records[0].date_logged, Local::now().date_naive());
    }

    #[test]
    fn record_rejects_out_of_range_severity() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let result = record_symptom(&conn, &patient, &entry(SymptomKind::Rashes, 4, "2025-06-01"));
        assert!(matches!(result, Err(DatabaseError::ConstraintViolation(_))));
    }

    #[test]
    fn record_requires_existing_patient() {
        let conn = test_db();
        let result = record_symptom(
            &conn,
            &Uuid::new_v4(),
            &entry(SymptomKind::Headache, 1, "2025-06-01"),
        );
        assert!(matches!(result, Err(DatabaseError::NotFound { ref entity_type, .. }) if entity_type == "Patient"));
    }

    #[test]
    fn entry_deserializes_catalog_key() {
        let e: SymptomEntry =
            serde_json::from_str(r#"{"symptom":"joint pain","severity":2}"#).unwrap();
        assert_eq!(e.symptom, SymptomKind::JointPain);
        assert!(e.date_logged.is_none());
    }

    // ───────────────────────────────────────
    // update / delete tests
    // ───────────────────────────────────────

    #[test]
    fn update_severity_changes_value() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let id = record_symptom(&conn, &patient, &entry(SymptomKind::BackPain, 1, "2025-06-01")).unwrap();

        update_severity(&conn, &patient, &id, 3).unwrap();
        assert_eq!(stored_severity(&conn, &id), 3);
    }

    #[test]
    fn update_severity_rejects_out_of_range() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let id = record_symptom(&conn, &patient, &entry(SymptomKind::BackPain, 1, "2025-06-01")).unwrap();

        assert!(matches!(
            update_severity(&conn, &patient, &id, 9),
            Err(DatabaseError::ConstraintViolation(_))
        ));
        assert_eq!(stored_severity(&conn, &id), 1);
    }

    #[test]
    fn update_other_patients_log_is_not_found() {
        let conn = test_db();
        let owner = seed_patient(&conn);
        let other = seed_patient(&conn);
        let id = record_symptom(&conn, &owner, &entry(SymptomKind::EyePain, 1, "2025-06-01")).unwrap();

        assert!(matches!(
            update_severity(&conn, &other, &id, 2),
            Err(DatabaseError::NotFound { .. })
        ));
        assert_eq!(stored_severity(&conn, &id), 1);
    }

    #[test]
    fn delete_removes_log() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        let id = record_symptom(&conn, &patient, &entry(SymptomKind::Vomiting, 2, "2025-06-01")).unwrap();

        delete_symptom(&conn, &patient, &id).unwrap();
        assert!(db::get_symptom_records_for_patient(&conn, &patient).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_or_foreign_log_is_not_found() {
        let conn = test_db();
        let owner = seed_patient(&conn);
        let other = seed_patient(&conn);
        let id = record_symptom(&conn, &owner, &entry(SymptomKind::Fatigue, 0, "2025-06-01")).unwrap();

        assert!(matches!(
            delete_symptom(&conn, &other, &id),
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            delete_symptom(&conn, &owner, &Uuid::new_v4()),
            Err(DatabaseError::NotFound { .. })
        ));
        assert_eq!(db::get_symptom_records_for_patient(&conn, &owner).unwrap().len(), 1);
    }

    // ───────────────────────────────────────
    // history / catalog tests
    // ───────────────────────────────────────

    #[test]
    fn history_groups_by_day_newest_first() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        record_symptom(&conn, &patient, &entry(SymptomKind::Fever, 1, "2025-06-01")).unwrap();
        record_symptom(&conn, &patient, &entry(SymptomKind::Headache, 2, "2025-06-03")).unwrap();
        record_symptom(&conn, &patient, &entry(SymptomKind::Nausea, 1, "2025-06-03")).unwrap();
        record_symptom(&conn, &patient, &entry(SymptomKind::Rashes, 0, "2025-06-02")).unwrap();

        let days = history_by_date(&conn, &patient).unwrap();
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date("2025-06-03"), date("2025-06-02"), date("2025-06-01")]);
        assert_eq!(days[0].entries.len(), 2);
        assert_eq!(days[1].entries.len(), 1);
    }

    #[test]
    fn history_empty_for_new_patient() {
        let conn = test_db();
        let patient = seed_patient(&conn);
        assert!(history_by_date(&conn, &patient).unwrap().is_empty());
    }

    #[test]
    fn catalog_covers_every_symptom() {
        let catalog = symptom_catalog();
        assert_eq!(catalog.len(), 20);
        assert_eq!(catalog.iter().filter(|c| c.high_risk).count(), 10);
        assert_eq!(catalog[0].key, "fever");
        assert!(!catalog[0].high_risk);

        let gums = catalog.iter().find(|c| c.key == "bleeding gums").unwrap();
        assert!(gums.high_risk);
        assert_eq!(gums.label, "Bleeding (Gums/Nose)");
    }
}
