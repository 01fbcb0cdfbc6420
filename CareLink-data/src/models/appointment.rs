use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for an appointment, joined with both participant names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
}

/// Input data for booking an appointment
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date: DateTime<Utc>,
    pub reason: Option<String>,
    pub status: String,
}
