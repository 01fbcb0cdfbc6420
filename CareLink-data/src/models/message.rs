use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a direct message, joined with both participant names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub sender_name: Option<String>,
    pub receiver_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub receiver_id: i64,
    pub message: String,
}
