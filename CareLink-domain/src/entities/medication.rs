use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::validate_time_of_day;

/// How much of a medication is left. Derived from the remaining tablet count on every read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Critical,
    Low,
    Medium,
    High,
}

impl StockLevel {
    /// Critical and low stock both need a refill soon
    pub fn needs_refill(&self) -> bool {
        matches!(self, StockLevel::Critical | StockLevel::Low)
    }
}

/// Classify a remaining tablet count.
///
/// * below 5: critical
/// * 5 to 10: low
/// * 11 to 20: medium
/// * above 20: high
pub fn stock_level(remaining_tablets: i64) -> StockLevel {
    match remaining_tablets {
        n if n < 5 => StockLevel::Critical,
        5..=10 => StockLevel::Low,
        11..=20 => StockLevel::Medium,
        _ => StockLevel::High,
    }
}

/// Tracked medication with its computed stock level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Medication {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub dosage: String,
    /// Time of day to take it (HH:MM)
    pub time: String,
    pub total_tablets: i64,
    pub remaining_tablets: i64,
    pub stock_level: StockLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateMedicationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Dosage must be between 1 and 50 characters"))]
    pub dosage: String,
    #[validate(custom = "validate_time_of_day")]
    pub time: String,
    #[validate(range(min = 0, message = "Total tablets cannot be negative"))]
    pub total_tablets: i64,
    #[validate(range(min = 0, message = "Remaining tablets cannot be negative"))]
    pub remaining_tablets: i64,
}

/// Partial update. Fields left out keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateMedicationRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50, message = "Dosage must be between 1 and 50 characters"))]
    pub dosage: Option<String>,
    #[validate(custom = "validate_time_of_day")]
    pub time: Option<String>,
    #[validate(range(min = 0, message = "Total tablets cannot be negative"))]
    pub total_tablets: Option<i64>,
    #[validate(range(min = 0, message = "Remaining tablets cannot be negative"))]
    pub remaining_tablets: Option<i64>,
}
