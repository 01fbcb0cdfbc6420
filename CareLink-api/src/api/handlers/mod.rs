pub mod appointments;
pub mod auth;
pub mod doctors;
pub mod health;
pub mod health_records;
pub mod medications;
pub mod messages;
pub mod patients;
pub mod prescriptions;
pub mod reminders;
pub mod symptom_diary;

// Re-export handlers for easier imports
pub use health::{health_check, root};
