use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// One symptom diary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct SymptomEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub symptoms: String,
    /// 1 (mild) to 10 (severe)
    pub severity: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateSymptomEntryRequest {
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 2000, message = "Symptoms must be between 1 and 2000 characters"))]
    pub symptoms: String,
    #[validate(range(min = 1, max = 10, message = "Severity must be between 1 and 10"))]
    pub severity: i64,
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}
