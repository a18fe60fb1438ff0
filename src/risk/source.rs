//! Read access to the patient data the risk engine consumes.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{AppointmentBooking, Patient, SymptomRecord};

/// Half-open date range `[start, end)` over `date_logged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    /// Dates touched by the interval `[now - span, now]`.
    ///
    /// Records carry a date, not a time, so the window starts on the date
    /// `span` before `now` and ends after today.
    pub fn trailing(now: NaiveDateTime, span: Duration) -> Self {
        Self {
            start: (now - span).date(),
            end: now.date() + Duration::days(1),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Collaborator boundary: profile lookup, symptom history and bookings.
pub trait PatientDataSource {
    fn find_patient(&self, patient_id: &Uuid) -> Result<Option<Patient>, DatabaseError>;

    fn symptoms_between(
        &self,
        patient_id: &Uuid,
        window: &Window,
    ) -> Result<Vec<SymptomRecord>, DatabaseError>;

    fn bookings_for(&self, patient_id: &Uuid) -> Result<Vec<AppointmentBooking>, DatabaseError>;
}

/// SQLite-backed source over an open connection.
pub struct SqliteSource<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteSource<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl PatientDataSource for SqliteSource<'_> {
    fn find_patient(&self, patient_id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        db::get_patient(self.conn, patient_id)
    }

    fn symptoms_between(
        &self,
        patient_id: &Uuid,
        window: &Window,
    ) -> Result<Vec<SymptomRecord>, DatabaseError> {
        db::get_symptom_records_between(self.conn, patient_id, &window.start, &window.end)
    }

    fn bookings_for(&self, patient_id: &Uuid) -> Result<Vec<AppointmentBooking>, DatabaseError> {
        db::get_bookings_for_patient(self.conn, patient_id)
    }
}
