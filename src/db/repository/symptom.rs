use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::SymptomKind;
use crate::models::SymptomRecord;

pub fn insert_symptom_record(
    conn: &Connection,
    record: &SymptomRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptom_logs (id, patient_id, symptom, severity, date_logged)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id.to_string(),
            record.patient_id.to_string(),
            record.symptom.as_str(),
            record.severity as i32,
            record.date_logged.to_string(),
        ],
    )?;
    Ok(())
}

/// Records for one patient with `start <= date_logged < end`, oldest first.
pub fn get_symptom_records_between(
    conn: &Connection,
    patient_id: &Uuid,
    start: &NaiveDate,
    end: &NaiveDate,
) -> Result<Vec<SymptomRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, symptom, severity, date_logged
         FROM symptom_logs
         WHERE patient_id = ?1 AND date_logged >= ?2 AND date_logged < ?3
         ORDER BY date_logged ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![patient_id.to_string(), start.to_string(), end.to_string()],
        symptom_row,
    )?;

    symptom_rows_to_vec(rows)
}

/// Every record for one patient, newest date first.
pub fn get_symptom_records_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<SymptomRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, symptom, severity, date_logged
         FROM symptom_logs
         WHERE patient_id = ?1
         ORDER BY date_logged DESC, id ASC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], symptom_row)?;

    symptom_rows_to_vec(rows)
}

type SymptomRow = (String, String, String, i32, String);

fn symptom_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SymptomRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, String>(2)?,
        row.get::<_, i32>(3)?,
        row.get::<_, String>(4)?,
    ))
}

fn symptom_rows_to_vec(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<SymptomRow>>,
) -> Result<Vec<SymptomRecord>, DatabaseError> {
    let mut records = Vec::new();
    for row in rows {
        let (id, patient_id, symptom, severity, date_logged) = row?;
        let severity = u8::try_from(severity).map_err(|_| {
            DatabaseError::ConstraintViolation(format!("Invalid severity: {severity}"))
        })?;
        records.push(SymptomRecord {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            symptom: SymptomKind::from_str(&symptom)?,
            severity,
            date_logged: parse_date(&date_logged)?,
        });
    }
    Ok(records)
}
