use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "with-api")]
use utoipa::ToSchema;

use super::validate_time_of_day;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    Medicine,
    Food,
    Exercise,
    Custom,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Medicine => "medicine",
            ReminderType::Food => "food",
            ReminderType::Exercise => "exercise",
            ReminderType::Custom => "custom",
        }
    }
}

impl fmt::Display for ReminderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medicine" => Ok(ReminderType::Medicine),
            "food" => Ok(ReminderType::Food),
            "exercise" => Ok(ReminderType::Exercise),
            "custom" => Ok(ReminderType::Custom),
            other => Err(format!("Unknown reminder type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct Reminder {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    pub title: String,
    /// HH:MM
    pub time: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateReminderRequest {
    #[serde(rename = "type")]
    pub reminder_type: ReminderType,
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: String,
    #[validate(custom = "validate_time_of_day")]
    pub time: String,
    /// Defaults to active
    pub is_active: Option<bool>,
}

/// Partial update. Fields left out keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct UpdateReminderRequest {
    #[serde(rename = "type")]
    pub reminder_type: Option<ReminderType>,
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters"))]
    pub title: Option<String>,
    #[validate(custom = "validate_time_of_day")]
    pub time: Option<String>,
    pub is_active: Option<bool>,
}
