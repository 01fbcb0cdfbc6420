use std::sync::Arc;

use axum::extract::FromRef;
use tracing::info;

use care_link_data::database::DatabasePool;
use care_link_data::repository::{
    AppointmentRepository, HealthRecordRepository, MedicationRepository, MessageRepository,
    PrescriptionRepository, ReminderRepository, SymptomDiaryRepository, UserRepository,
};
use care_link_domain::auth::authorize::Authorizer;
use care_link_domain::auth::password::PasswordHasher;
use care_link_domain::auth::token::TokenConfig;
use care_link_domain::auth::{CredentialService, CredentialServiceTrait};
use care_link_domain::health::{HealthService, HealthServiceTrait};
use care_link_domain::services::{
    AppointmentService, AppointmentServiceTrait, DashboardService, DashboardServiceTrait, DoctorService,
    DoctorServiceTrait, HealthRecordService, HealthRecordServiceTrait, MedicationService, MedicationServiceTrait,
    MessageService, MessageServiceTrait, PrescriptionService, PrescriptionServiceTrait, ReminderService,
    ReminderServiceTrait, SymptomDiaryService, SymptomDiaryServiceTrait,
};
use care_link_domain::storage::{DocumentStore, LocalDocumentStore, StorageConfig};

pub type CredentialServiceRef = Arc<dyn CredentialServiceTrait>;
pub type AppointmentServiceRef = Arc<dyn AppointmentServiceTrait>;
pub type PrescriptionServiceRef = Arc<dyn PrescriptionServiceTrait>;
pub type MedicationServiceRef = Arc<dyn MedicationServiceTrait>;
pub type ReminderServiceRef = Arc<dyn ReminderServiceTrait>;
pub type SymptomDiaryServiceRef = Arc<dyn SymptomDiaryServiceTrait>;
pub type MessageServiceRef = Arc<dyn MessageServiceTrait>;
pub type HealthRecordServiceRef = Arc<dyn HealthRecordServiceTrait>;
pub type DoctorServiceRef = Arc<dyn DoctorServiceTrait>;
pub type DashboardServiceRef = Arc<dyn DashboardServiceTrait>;
pub type HealthServiceRef = Arc<dyn HealthServiceTrait>;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialServiceRef,
    pub appointments: AppointmentServiceRef,
    pub prescriptions: PrescriptionServiceRef,
    pub medications: MedicationServiceRef,
    pub reminders: ReminderServiceRef,
    pub symptom_diary: SymptomDiaryServiceRef,
    pub messages: MessageServiceRef,
    pub health_records: HealthRecordServiceRef,
    pub doctors: DoctorServiceRef,
    pub dashboard: DashboardServiceRef,
    pub health: HealthServiceRef,
    /// Largest accepted upload in bytes
    pub max_upload_size: usize,
    /// Reported by the health check
    pub environment: String,
}

impl AppState {
    /// Wire every repository and service over one pool
    pub fn new(
        pool: DatabasePool,
        tokens: TokenConfig,
        hasher: PasswordHasher,
        storage: StorageConfig,
        environment: impl Into<String>,
    ) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let appointments = Arc::new(AppointmentRepository::new(pool.clone()));
        let health_records = Arc::new(HealthRecordRepository::new(pool.clone()));
        let medications = Arc::new(MedicationRepository::new(pool.clone()));
        let reminders = Arc::new(ReminderRepository::new(pool.clone()));
        let symptoms = Arc::new(SymptomDiaryRepository::new(pool.clone()));
        let max_upload_size = storage.max_file_size;
        let documents: Arc<dyn DocumentStore> = Arc::new(LocalDocumentStore::new(storage));
        let authorizer = Authorizer::new(appointments.clone());

        info!("Application services created over {}", pool.connection_info());

        Self {
            credentials: Arc::new(CredentialService::new(users.clone(), hasher, tokens)),
            appointments: Arc::new(AppointmentService::new(
                appointments.clone(),
                users.clone(),
                authorizer.clone(),
            )),
            prescriptions: Arc::new(PrescriptionService::new(
                Arc::new(PrescriptionRepository::new(pool.clone())),
                users.clone(),
                authorizer.clone(),
            )),
            medications: Arc::new(MedicationService::new(medications.clone(), authorizer.clone())),
            reminders: Arc::new(ReminderService::new(reminders.clone(), authorizer.clone())),
            symptom_diary: Arc::new(SymptomDiaryService::new(symptoms.clone(), authorizer.clone())),
            messages: Arc::new(MessageService::new(
                Arc::new(MessageRepository::new(pool.clone())),
                users.clone(),
                authorizer.clone(),
            )),
            health_records: Arc::new(HealthRecordService::new(
                health_records.clone(),
                documents,
                authorizer.clone(),
            )),
            doctors: Arc::new(DoctorService::new(
                users,
                appointments.clone(),
                health_records,
                symptoms,
                authorizer.clone(),
            )),
            dashboard: Arc::new(DashboardService::new(medications, reminders, appointments, authorizer)),
            health: Arc::new(HealthService::new(pool)),
            max_upload_size,
            environment: environment.into(),
        }
    }
}

macro_rules! service_from_state {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            impl FromRef<AppState> for $ty {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

service_from_state!(
    credentials: CredentialServiceRef,
    appointments: AppointmentServiceRef,
    prescriptions: PrescriptionServiceRef,
    medications: MedicationServiceRef,
    reminders: ReminderServiceRef,
    symptom_diary: SymptomDiaryServiceRef,
    messages: MessageServiceRef,
    health_records: HealthRecordServiceRef,
    doctors: DoctorServiceRef,
    dashboard: DashboardServiceRef,
    health: HealthServiceRef,
);
