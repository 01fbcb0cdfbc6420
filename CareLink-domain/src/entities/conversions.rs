use care_link_data::models::appointment::AppointmentRow;
use care_link_data::models::health_record::HealthRecordRow;
use care_link_data::models::medication::{MedicationChanges, MedicationRow};
use care_link_data::models::message::MessageRow;
use care_link_data::models::prescription::PrescriptionRow;
use care_link_data::models::reminder::{ReminderChanges, ReminderRow};
use care_link_data::models::symptom_diary::SymptomEntryRow;
use care_link_data::models::user::UserRow;

use crate::entities::{
    stock_level, Appointment, HealthRecord, Medication, Message, Prescription, Reminder, SymptomEntry,
    UpdateMedicationRequest, UpdateReminderRequest, User,
};

// Conversion functions between data rows and domain entities.
// They follow the pattern convert_to_[target_layer]_[model_name].
// Enumerated columns are parsed here; a value the schema should have
// rejected comes back as an error message.

pub fn convert_to_domain_user(row: UserRow) -> Result<User, String> {
    Ok(User {
        id: row.id,
        name: row.name,
        email: row.email,
        role: row.role.parse()?,
        created_at: row.created_at,
    })
}

pub fn convert_to_domain_appointment(row: AppointmentRow) -> Result<Appointment, String> {
    Ok(Appointment {
        id: row.id,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        date: row.date,
        reason: row.reason,
        status: row.status.parse()?,
        created_at: row.created_at,
        patient_name: row.patient_name,
        doctor_name: row.doctor_name,
    })
}

pub fn convert_to_domain_prescription(row: PrescriptionRow) -> Prescription {
    Prescription {
        id: row.id,
        patient_id: row.patient_id,
        doctor_id: row.doctor_id,
        medicine: row.medicine,
        dosage: row.dosage,
        timing: row.timing,
        duration: row.duration,
        notes: row.notes,
        created_at: row.created_at,
        patient_name: row.patient_name,
        doctor_name: row.doctor_name,
    }
}

/// The stock level is computed here, never read from storage
pub fn convert_to_domain_medication(row: MedicationRow) -> Medication {
    Medication {
        id: row.id,
        user_id: row.user_id,
        name: row.name,
        dosage: row.dosage,
        time: row.time,
        total_tablets: row.total_tablets,
        remaining_tablets: row.remaining_tablets,
        stock_level: stock_level(row.remaining_tablets),
        created_at: row.created_at,
    }
}

pub fn convert_to_data_medication_changes(request: UpdateMedicationRequest) -> MedicationChanges {
    MedicationChanges {
        name: request.name,
        dosage: request.dosage,
        time: request.time,
        total_tablets: request.total_tablets,
        remaining_tablets: request.remaining_tablets,
    }
}

pub fn convert_to_domain_reminder(row: ReminderRow) -> Result<Reminder, String> {
    Ok(Reminder {
        id: row.id,
        user_id: row.user_id,
        reminder_type: row.reminder_type.parse()?,
        title: row.title,
        time: row.time,
        is_active: row.is_active,
        created_at: row.created_at,
    })
}

pub fn convert_to_data_reminder_changes(request: UpdateReminderRequest) -> ReminderChanges {
    ReminderChanges {
        reminder_type: request.reminder_type.map(|t| t.as_str().to_string()),
        title: request.title,
        time: request.time,
        is_active: request.is_active,
    }
}

pub fn convert_to_domain_symptom_entry(row: SymptomEntryRow) -> SymptomEntry {
    SymptomEntry {
        id: row.id,
        user_id: row.user_id,
        date: row.date,
        symptoms: row.symptoms,
        severity: row.severity,
        notes: row.notes,
        created_at: row.created_at,
    }
}

pub fn convert_to_domain_message(row: MessageRow) -> Message {
    Message {
        id: row.id,
        sender_id: row.sender_id,
        receiver_id: row.receiver_id,
        message: row.message,
        timestamp: row.timestamp,
        is_read: row.is_read,
        sender_name: row.sender_name,
        receiver_name: row.receiver_name,
    }
}

pub fn convert_to_domain_health_record(row: HealthRecordRow) -> Result<HealthRecord, String> {
    Ok(HealthRecord {
        id: row.id,
        patient_id: row.patient_id,
        record_type: row.record_type.parse()?,
        title: row.title,
        file_url: row.file_url,
        notes: row.notes,
        uploaded_at: row.uploaded_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AppointmentStatus, ReminderType, Role, StockLevel};
    use chrono::Utc;

    #[test]
    fn test_convert_user_drops_password_hash() {
        let row = UserRow {
            id: 3,
            name: "Dr. Grey".to_string(),
            email: "grey@example.com".to_string(),
            password_hash: "secret-hash".to_string(),
            role: "doctor".to_string(),
            created_at: Utc::now(),
        };

        let user = convert_to_domain_user(row).unwrap();
        assert_eq!(user.role, Role::Doctor);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }

    #[test]
    fn test_convert_user_rejects_unknown_role() {
        let row = UserRow {
            id: 1,
            name: "x".to_string(),
            email: "x@example.com".to_string(),
            password_hash: String::new(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        };
        assert!(convert_to_domain_user(row).is_err());
    }

    #[test]
    fn test_convert_appointment_status() {
        let row = AppointmentRow {
            id: 1,
            patient_id: 2,
            doctor_id: 3,
            date: Utc::now(),
            reason: None,
            status: "approved".to_string(),
            created_at: Utc::now(),
            patient_name: Some("Pat".to_string()),
            doctor_name: Some("Doc".to_string()),
        };
        let appointment = convert_to_domain_appointment(row).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Approved);
        assert_eq!(appointment.doctor_name.as_deref(), Some("Doc"));
    }

    #[test]
    fn test_convert_medication_computes_stock_level() {
        let row = MedicationRow {
            id: 1,
            user_id: 1,
            name: "Aspirin".to_string(),
            dosage: "81mg".to_string(),
            time: "09:00".to_string(),
            total_tablets: 30,
            remaining_tablets: 7,
            created_at: Utc::now(),
        };
        assert_eq!(convert_to_domain_medication(row).stock_level, StockLevel::Low);
    }

    #[test]
    fn test_reminder_changes_use_stored_type_names() {
        let changes = convert_to_data_reminder_changes(UpdateReminderRequest {
            reminder_type: Some(ReminderType::Exercise),
            ..Default::default()
        });
        assert_eq!(changes.reminder_type.as_deref(), Some("exercise"));
        assert!(changes.title.is_none());
    }
}
