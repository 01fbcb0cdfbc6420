use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::root,
        crate::api::handlers::health::health_check,

        // Auth endpoints
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::me,
        crate::api::handlers::auth::delete_me,

        // Appointments
        crate::api::handlers::appointments::list_appointments,
        crate::api::handlers::appointments::create_appointment,
        crate::api::handlers::appointments::update_appointment_status,
        crate::api::handlers::appointments::delete_appointment,

        // Prescriptions
        crate::api::handlers::prescriptions::list_prescriptions,
        crate::api::handlers::prescriptions::create_prescription,

        // Medications
        crate::api::handlers::medications::list_medications,
        crate::api::handlers::medications::get_medication,
        crate::api::handlers::medications::create_medication,
        crate::api::handlers::medications::update_medication,
        crate::api::handlers::medications::delete_medication,

        // Reminders
        crate::api::handlers::reminders::list_reminders,
        crate::api::handlers::reminders::create_reminder,
        crate::api::handlers::reminders::update_reminder,
        crate::api::handlers::reminders::delete_reminder,

        // Symptom diary
        crate::api::handlers::symptom_diary::list_symptom_entries,
        crate::api::handlers::symptom_diary::create_symptom_entry,
        crate::api::handlers::symptom_diary::delete_symptom_entry,

        // Messages
        crate::api::handlers::messages::list_messages,
        crate::api::handlers::messages::send_message,
        crate::api::handlers::messages::chat_history,
        crate::api::handlers::messages::mark_message_read,

        // Health records
        crate::api::handlers::health_records::list_health_records,
        crate::api::handlers::health_records::upload_health_record,
        crate::api::handlers::health_records::delete_health_record,

        // Doctor and patient views
        crate::api::handlers::doctors::list_patients,
        crate::api::handlers::doctors::patient_records,
        crate::api::handlers::patients::dashboard,
    ),
    components(
        schemas(
            crate::entities::ErrorResponse,
            crate::entities::UploadHealthRecordForm,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,
            crate::api::handlers::health::RootResponse,

            care_link_domain::auth::RegisterRequest,
            care_link_domain::auth::LoginRequest,
            care_link_domain::auth::AuthResponse,

            care_link_domain::entities::Role,
            care_link_domain::entities::User,
            care_link_domain::entities::Appointment,
            care_link_domain::entities::AppointmentStatus,
            care_link_domain::entities::CreateAppointmentRequest,
            care_link_domain::entities::UpdateAppointmentStatusRequest,
            care_link_domain::entities::Prescription,
            care_link_domain::entities::CreatePrescriptionRequest,
            care_link_domain::entities::Medication,
            care_link_domain::entities::StockLevel,
            care_link_domain::entities::CreateMedicationRequest,
            care_link_domain::entities::UpdateMedicationRequest,
            care_link_domain::entities::Reminder,
            care_link_domain::entities::ReminderType,
            care_link_domain::entities::CreateReminderRequest,
            care_link_domain::entities::UpdateReminderRequest,
            care_link_domain::entities::SymptomEntry,
            care_link_domain::entities::CreateSymptomEntryRequest,
            care_link_domain::entities::Message,
            care_link_domain::entities::SendMessageRequest,
            care_link_domain::entities::HealthRecord,
            care_link_domain::entities::RecordType,
            care_link_domain::entities::PatientDashboard,
            care_link_domain::entities::PatientRecords,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Service status"),
        (name = "auth", description = "Registration, login and the current account"),
        (name = "appointments", description = "Patient bookings and doctor approvals"),
        (name = "prescriptions", description = "Prescriptions written by doctors"),
        (name = "medications", description = "Patient medication stock"),
        (name = "reminders", description = "Daily reminders"),
        (name = "symptom_diary", description = "Symptom diary entries"),
        (name = "messages", description = "Direct messages between users"),
        (name = "health_records", description = "Uploaded medical documents"),
        (name = "doctors", description = "Doctor views of linked patients"),
        (name = "patients", description = "Patient dashboard")
    ),
    info(
        title = "CareLink API",
        version = "0.1.0",
        description = "API connecting patients and doctors: appointments, prescriptions, medications and health records",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "CareLink API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags");
        assert!(tags.iter().any(|tag| tag.name == "appointments"));
        assert!(tags.iter().any(|tag| tag.name == "health_records"));

        for path in [
            "/health",
            "/api/auth/register",
            "/api/appointments/{id}",
            "/api/messages/chat/{user_id}",
            "/api/doctors/patient/{patient_id}/records",
            "/api/patients/dashboard",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }

    #[test]
    fn test_error_and_upload_schemas_referenced() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.as_ref().expect("components");
        assert!(components.schemas.contains_key("ErrorResponse"));

        let json = openapi.to_json().expect("openapi json");
        assert!(json.contains("#/components/schemas/ErrorResponse"));
        assert!(json.contains("#/components/schemas/UploadHealthRecordForm"));
    }
}
