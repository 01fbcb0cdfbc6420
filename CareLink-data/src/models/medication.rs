use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a tracked medication. Stock level is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationRow {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub dosage: String,
    /// HH:MM
    pub time: String,
    pub total_tablets: i64,
    pub remaining_tablets: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewMedication {
    pub user_id: i64,
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub total_tablets: i64,
    pub remaining_tablets: i64,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct MedicationChanges {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub time: Option<String>,
    pub total_tablets: Option<i64>,
    pub remaining_tablets: Option<i64>,
}
