use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{parse_date, parse_uuid};
use crate::db::DatabaseError;
use crate::models::enums::BookingStatus;
use crate::models::AppointmentBooking;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn insert_booking(conn: &Connection, booking: &AppointmentBooking) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointment_bookings (id, patient_id, doctor_name, booking_date, booked_on, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            booking.id.to_string(),
            booking.patient_id.to_string(),
            booking.doctor_name,
            booking.booking_date.to_string(),
            booking.booked_on.format(TIMESTAMP_FORMAT).to_string(),
            booking.status.as_str(),
        ],
    )?;
    Ok(())
}

/// All bookings for a patient, most recent booking date first.
pub fn get_bookings_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<AppointmentBooking>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, doctor_name, booking_date, booked_on, status
         FROM appointment_bookings
         WHERE patient_id = ?1
         ORDER BY booking_date DESC, booked_on DESC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut bookings = Vec::new();
    for row in rows {
        let (id, patient_id, doctor_name, booking_date, booked_on, status) = row?;
        bookings.push(AppointmentBooking {
            id: parse_uuid(&id)?,
            patient_id: parse_uuid(&patient_id)?,
            doctor_name,
            booking_date: parse_date(&booking_date)?,
            booked_on: NaiveDateTime::parse_from_str(&booked_on, TIMESTAMP_FORMAT)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            status: BookingStatus::from_str(&status)?,
        });
    }
    Ok(bookings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_patient;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Patient;
    use chrono::NaiveDate;

    fn booking(patient_id: Uuid, doctor: &str, date: &str) -> AppointmentBooking {
        let booking_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        AppointmentBooking {
            id: Uuid::new_v4(),
            patient_id,
            doctor_name: doctor.into(),
            booking_date,
            booked_on: booking_date.and_hms_opt(9, 30, 0).unwrap(),
            status: BookingStatus::Pending,
        }
    }

    #[test]
    fn bookings_listed_newest_first() {
        let conn = open_memory_database().unwrap();
        let patient_id = Uuid::new_v4();
        insert_patient(
            &conn,
            &Patient {
                id: patient_id,
                full_name: "Booked Patient".into(),
                age: None,
            },
        )
        .unwrap();
        insert_booking(&conn, &booking(patient_id, "Dr. Karim", "2025-04-01")).unwrap();
        insert_booking(&conn, &booking(patient_id, "Dr. Lee", "2025-04-10")).unwrap();

        let bookings = get_bookings_for_patient(&conn, &patient_id).unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].doctor_name, "Dr. Lee");
        assert_eq!(bookings[1].status, BookingStatus::Pending);
    }

    #[test]
    fn no_bookings_is_empty() {
        let conn = open_memory_database().unwrap();
        assert!(get_bookings_for_patient(&conn, &Uuid::new_v4()).unwrap().is_empty());
    }
}
