// Storage models, one module per table
pub mod appointment;
pub mod health_record;
pub mod medication;
pub mod message;
pub mod prescription;
pub mod reminder;
pub mod symptom_diary;
pub mod user;
