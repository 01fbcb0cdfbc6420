use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage model for a user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Encoded password hash, never the password itself
    pub password_hash: String,
    /// "patient" or "doctor"
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for inserting a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}
