// Shared fixtures for service tests
// Builds every service over one migrated in-memory database and a scratch upload directory.
// Available to other crates through the "testing" feature.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use care_link_data::database::DatabasePool;
use care_link_data::models::appointment::NewAppointment;
use care_link_data::models::user::NewUser;
use care_link_data::repository::{
    AppointmentRepository, AppointmentRepositoryTrait, HealthRecordRepository, MedicationRepository,
    MessageRepository, PrescriptionRepository, ReminderRepository, SymptomDiaryRepository, UserRepository,
    UserRepositoryTrait,
};

use crate::auth::authorize::Authorizer;
use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenConfig;
use crate::auth::{CredentialService, Principal};
use crate::entities::{AppointmentStatus, Role};
use crate::services::{
    AppointmentService, DashboardService, DoctorService, HealthRecordService, MedicationService, MessageService,
    PrescriptionService, ReminderService, SymptomDiaryService,
};
use crate::storage::{LocalDocumentStore, StorageConfig, PUBLIC_PREFIX};

static NEXT_EMAIL: AtomicUsize = AtomicUsize::new(1);

const TEST_MAX_FILE_SIZE: usize = 64 * 1024;

/// Iterations low enough to keep tests fast
pub const TEST_HASH_ITERATIONS: u32 = 1_000;

pub fn test_token_config() -> TokenConfig {
    TokenConfig::new("care-link-test-secret", "care-link-test", Duration::minutes(5))
}

pub struct Fixture {
    pub pool: DatabasePool,
    uploads: TempDir,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            pool: DatabasePool::in_memory().expect("in-memory database"),
            uploads: tempfile::tempdir().expect("upload directory"),
        }
    }

    fn users(&self) -> Arc<UserRepository> {
        Arc::new(UserRepository::new(self.pool.clone()))
    }

    fn appointments(&self) -> Arc<AppointmentRepository> {
        Arc::new(AppointmentRepository::new(self.pool.clone()))
    }

    async fn user(&self, name: &str, role: Role) -> Principal {
        let n = NEXT_EMAIL.fetch_add(1, Ordering::Relaxed);
        let row = self
            .users()
            .create(NewUser {
                name: name.to_string(),
                email: format!("{}{}@example.com", role, n),
                password_hash: "unused".to_string(),
                role: role.as_str().to_string(),
            })
            .await
            .expect("seed user");
        Principal { user_id: row.id, role }
    }

    pub async fn patient(&self, name: &str) -> Principal {
        self.user(name, Role::Patient).await
    }

    pub async fn doctor(&self, name: &str) -> Principal {
        self.user(name, Role::Doctor).await
    }

    /// Book a pending appointment tomorrow and return its id
    pub async fn book(&self, patient: &Principal, doctor: &Principal) -> i64 {
        self.appointments()
            .create(NewAppointment {
                patient_id: patient.user_id,
                doctor_id: doctor.user_id,
                date: Utc::now() + Duration::days(1),
                reason: None,
                status: AppointmentStatus::Pending.as_str().to_string(),
            })
            .await
            .expect("seed appointment")
            .id
    }

    pub async fn cancel_booking(&self, appointment_id: i64) {
        assert!(self.appointments().delete(appointment_id).await.expect("delete appointment"));
    }

    pub fn authorizer(&self) -> Authorizer {
        Authorizer::new(self.appointments())
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            upload_dir: self.uploads.path().to_path_buf(),
            max_file_size: TEST_MAX_FILE_SIZE,
        }
    }

    pub fn max_file_size(&self) -> usize {
        TEST_MAX_FILE_SIZE
    }

    /// Where a public upload path lives on disk
    pub fn upload_path(&self, public_path: &str) -> PathBuf {
        let relative = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .unwrap_or(public_path)
            .trim_start_matches('/');
        self.uploads.path().join(relative)
    }

    pub fn credential_service(&self) -> CredentialService {
        CredentialService::new(self.users(), PasswordHasher::new(TEST_HASH_ITERATIONS), test_token_config())
    }

    pub fn appointment_service(&self) -> AppointmentService {
        AppointmentService::new(self.appointments(), self.users(), self.authorizer())
    }

    pub fn prescription_service(&self) -> PrescriptionService {
        PrescriptionService::new(
            Arc::new(PrescriptionRepository::new(self.pool.clone())),
            self.users(),
            self.authorizer(),
        )
    }

    pub fn medication_service(&self) -> MedicationService {
        MedicationService::new(Arc::new(MedicationRepository::new(self.pool.clone())), self.authorizer())
    }

    pub fn reminder_service(&self) -> ReminderService {
        ReminderService::new(Arc::new(ReminderRepository::new(self.pool.clone())), self.authorizer())
    }

    pub fn symptom_diary_service(&self) -> SymptomDiaryService {
        SymptomDiaryService::new(Arc::new(SymptomDiaryRepository::new(self.pool.clone())), self.authorizer())
    }

    pub fn message_service(&self) -> MessageService {
        MessageService::new(
            Arc::new(MessageRepository::new(self.pool.clone())),
            self.users(),
            self.authorizer(),
        )
    }

    pub fn health_record_service(&self) -> HealthRecordService {
        HealthRecordService::new(
            Arc::new(HealthRecordRepository::new(self.pool.clone())),
            Arc::new(LocalDocumentStore::new(self.storage_config())),
            self.authorizer(),
        )
    }

    pub fn doctor_service(&self) -> DoctorService {
        DoctorService::new(
            self.users(),
            self.appointments(),
            Arc::new(HealthRecordRepository::new(self.pool.clone())),
            Arc::new(SymptomDiaryRepository::new(self.pool.clone())),
            self.authorizer(),
        )
    }

    pub fn dashboard_service(&self) -> DashboardService {
        DashboardService::new(
            Arc::new(MedicationRepository::new(self.pool.clone())),
            Arc::new(ReminderRepository::new(self.pool.clone())),
            self.appointments(),
            self.authorizer(),
        )
    }
}
