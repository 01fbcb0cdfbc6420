use serde::{Deserialize, Serialize};
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::{Appointment, HealthRecord, Medication, Reminder, SymptomEntry, User};

/// Aggregated overview for a patient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PatientDashboard {
    pub medications: Vec<Medication>,
    pub reminders: Vec<Reminder>,
    /// Approved appointments from now on, soonest first
    pub upcoming_appointments: Vec<Appointment>,
    /// Medications with critical or low stock
    pub low_stock_medications: Vec<Medication>,
}

/// What a linked doctor sees of one patient
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct PatientRecords {
    pub patient: User,
    pub health_records: Vec<HealthRecord>,
    /// Most recent entries only
    pub symptom_diary: Vec<SymptomEntry>,
}
