use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::BookingStatus;

/// A booking as shown on the patient dashboard. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentBooking {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_name: String,
    pub booking_date: NaiveDate,
    pub booked_on: NaiveDateTime,
    pub status: BookingStatus,
}
