// Domain entities and value objects
pub mod appointment;
pub mod conversions;
pub mod dashboard;
pub mod health_record;
pub mod medication;
pub mod message;
pub mod prescription;
pub mod reminder;
pub mod symptom_diary;
pub mod user;

// Re-export common types for easier imports
pub use appointment::{Appointment, AppointmentStatus, CreateAppointmentRequest, UpdateAppointmentStatusRequest};
pub use dashboard::{PatientDashboard, PatientRecords};
pub use health_record::{HealthRecord, RecordType, UploadHealthRecord};
pub use medication::{stock_level, CreateMedicationRequest, Medication, StockLevel, UpdateMedicationRequest};
pub use message::{Message, SendMessageRequest};
pub use prescription::{CreatePrescriptionRequest, Prescription};
pub use reminder::{CreateReminderRequest, Reminder, ReminderType, UpdateReminderRequest};
pub use symptom_diary::{CreateSymptomEntryRequest, SymptomEntry};
pub use user::{Role, User};

use chrono::NaiveTime;
use validator::ValidationError;

/// Validate a time of day written as zero-padded `HH:MM`
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok() {
        Ok(())
    } else {
        let mut error = ValidationError::new("time_of_day");
        error.message = Some("Time must use the HH:MM format".into());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day() {
        assert!(validate_time_of_day("08:30").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("8:30").is_err());
        assert!(validate_time_of_day("08:30:00").is_err());
        assert!(validate_time_of_day("noon").is_err());
    }
}
