use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a reminder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRow {
    pub id: i64,
    pub user_id: i64,
    /// "medicine", "food", "exercise" or "custom"
    pub reminder_type: String,
    pub title: String,
    pub time: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: i64,
    pub reminder_type: String,
    pub title: String,
    pub time: String,
    pub is_active: bool,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default)]
pub struct ReminderChanges {
    pub reminder_type: Option<String>,
    pub title: Option<String>,
    pub time: Option<String>,
    pub is_active: Option<bool>,
}
