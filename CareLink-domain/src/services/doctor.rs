use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use care_link_data::repository::{
    AppointmentRepositoryTrait, HealthRecordRepositoryTrait, SymptomDiaryRepositoryTrait, UserRepositoryTrait,
};

use crate::auth::authorize::{Action, Authorizer, Resource};
use crate::auth::Principal;
use crate::entities::conversions::{convert_to_domain_symptom_entry, convert_to_domain_user};
use crate::entities::{PatientRecords, Role, User};
use crate::services::health_record::to_health_records;
use crate::services::ServiceError;

/// Symptom entries shown to a doctor per patient
const RECENT_SYMPTOM_ENTRIES: usize = 10;

#[async_trait]
pub trait DoctorServiceTrait: Send + Sync {
    /// Patients who have at least one appointment with the calling doctor
    async fn list_patients(&self, principal: &Principal) -> Result<Vec<User>, ServiceError>;

    /// Health records and recent symptoms of a linked patient
    async fn patient_records(&self, principal: &Principal, patient_id: i64) -> Result<PatientRecords, ServiceError>;
}

pub struct DoctorService {
    users: Arc<dyn UserRepositoryTrait>,
    appointments: Arc<dyn AppointmentRepositoryTrait>,
    records: Arc<dyn HealthRecordRepositoryTrait>,
    symptoms: Arc<dyn SymptomDiaryRepositoryTrait>,
    authorizer: Authorizer,
}

impl DoctorService {
    pub fn new(
        users: Arc<dyn UserRepositoryTrait>,
        appointments: Arc<dyn AppointmentRepositoryTrait>,
        records: Arc<dyn HealthRecordRepositoryTrait>,
        symptoms: Arc<dyn SymptomDiaryRepositoryTrait>,
        authorizer: Authorizer,
    ) -> Self {
        Self {
            users,
            appointments,
            records,
            symptoms,
            authorizer,
        }
    }
}

#[async_trait]
impl DoctorServiceTrait for DoctorService {
    async fn list_patients(&self, principal: &Principal) -> Result<Vec<User>, ServiceError> {
        self.authorizer.require_role(principal, Role::Doctor, "patient list")?;

        self.appointments
            .list_patients_of_doctor(principal.user_id)
            .await?
            .into_iter()
            .map(convert_to_domain_user)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ServiceError::Internal)
    }

    async fn patient_records(&self, principal: &Principal, patient_id: i64) -> Result<PatientRecords, ServiceError> {
        self.authorizer.require_role(principal, Role::Doctor, "patient records")?;

        let patient = match self.users.find_by_id(patient_id).await? {
            Some(row) if row.role == Role::Patient.as_str() => {
                convert_to_domain_user(row).map_err(ServiceError::Internal)?
            }
            _ => return Err(ServiceError::NotFound(format!("Patient {} not found", patient_id))),
        };

        self.authorizer
            .enforce(principal, Action::Read, &Resource::HealthRecord { patient_id })
            .await?;
        self.authorizer
            .enforce(principal, Action::Read, &Resource::SymptomDiary { user_id: patient_id })
            .await?;

        let health_records = to_health_records(self.records.list_for_patient(patient_id).await?)?;
        let symptom_diary = self
            .symptoms
            .list_for_user(patient_id, Some(RECENT_SYMPTOM_ENTRIES))
            .await?
            .into_iter()
            .map(convert_to_domain_symptom_entry)
            .collect();

        debug!(
            "Doctor {} viewed {} records of patient {}",
            principal.user_id,
            health_records.len(),
            patient_id
        );
        Ok(PatientRecords {
            patient,
            health_records,
            symptom_diary,
        })
    }
}
