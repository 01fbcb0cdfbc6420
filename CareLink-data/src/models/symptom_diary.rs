use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a symptom diary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomEntryRow {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub symptoms: String,
    pub severity: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSymptomEntry {
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub symptoms: String,
    pub severity: i64,
    pub notes: Option<String>,
}
