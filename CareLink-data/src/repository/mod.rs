// Repository module structure
pub mod errors;
mod appointment;
mod health_record;
mod medication;
mod message;
mod prescription;
mod reminder;
mod symptom_diary;
mod user;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use appointment::{AppointmentRepository, AppointmentRepositoryTrait};
pub use health_record::{HealthRecordRepository, HealthRecordRepositoryTrait};
pub use medication::{MedicationRepository, MedicationRepositoryTrait};
pub use message::{MessageRepository, MessageRepositoryTrait};
pub use prescription::{PrescriptionRepository, PrescriptionRepositoryTrait};
pub use reminder::{ReminderRepository, ReminderRepositoryTrait};
pub use symptom_diary::{SymptomDiaryRepository, SymptomDiaryRepositoryTrait};
pub use user::{UserRepository, UserRepositoryTrait};
