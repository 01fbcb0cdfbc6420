use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use care_link_data::models::prescription::NewPrescription;
use care_link_data::repository::{PrescriptionRepositoryTrait, UserRepositoryTrait};

use crate::auth::authorize::{Action, Authorizer, Resource};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_prescription;
use crate::entities::{CreatePrescriptionRequest, Prescription, Role};
use crate::services::{validate_request, ServiceError};

#[async_trait]
pub trait PrescriptionServiceTrait: Send + Sync {
    /// Patients see prescriptions written for them, doctors the ones they wrote.
    /// The participant filter in the query is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<Prescription>, ServiceError>;

    async fn create(
        &self,
        principal: &Principal,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, ServiceError>;
}

pub struct PrescriptionService {
    prescriptions: Arc<dyn PrescriptionRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    authorizer: Authorizer,
}

impl PrescriptionService {
    pub fn new(
        prescriptions: Arc<dyn PrescriptionRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        authorizer: Authorizer,
    ) -> Self {
        Self { prescriptions, users, authorizer }
    }
}

#[async_trait]
impl PrescriptionServiceTrait for PrescriptionService {
    async fn list(&self, principal: &Principal) -> Result<Vec<Prescription>, ServiceError> {
        let rows = match principal.role {
            Role::Patient => self.prescriptions.list_for_patient(principal.user_id).await?,
            Role::Doctor => self.prescriptions.list_for_doctor(principal.user_id).await?,
        };
        Ok(rows.into_iter().map(convert_to_domain_prescription).collect())
    }

    async fn create(
        &self,
        principal: &Principal,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, ServiceError> {
        validate_request(&request)?;

        let resource = Resource::Prescription {
            patient_id: request.patient_id,
            doctor_id: principal.user_id,
        };
        self.authorizer.enforce(principal, Action::Create, &resource).await?;

        let patient = self.users.find_by_id(request.patient_id).await?;
        if !matches!(patient, Some(ref user) if user.role == Role::Patient.as_str()) {
            return Err(ServiceError::NotFound(format!("Patient {} not found", request.patient_id)));
        }

        let row = self
            .prescriptions
            .create(NewPrescription {
                patient_id: request.patient_id,
                doctor_id: principal.user_id,
                medicine: request.medicine,
                dosage: request.dosage,
                timing: request.timing,
                duration: request.duration,
                notes: request.notes,
            })
            .await?;

        info!(
            "Prescription {} written by doctor {} for patient {}",
            row.id, row.doctor_id, row.patient_id
        );
        Ok(convert_to_domain_prescription(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Fixture;

    fn amoxicillin(patient_id: i64) -> CreatePrescriptionRequest {
        CreatePrescriptionRequest {
            patient_id,
            medicine: "Amoxicillin".to_string(),
            dosage: "500mg".to_string(),
            timing: "Three times a day".to_string(),
            duration: Some("7 days".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_written_by_doctor_visible_to_both() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let doctor = fx.doctor("Dr. D").await;
        let service = fx.prescription_service();

        let created = service.create(&doctor, amoxicillin(patient.user_id)).await.unwrap();
        assert_eq!(created.doctor_id, doctor.user_id);

        let for_patient = service.list(&patient).await.unwrap();
        assert_eq!(for_patient.len(), 1);
        assert_eq!(for_patient[0].doctor_name.as_deref(), Some("Dr. D"));

        let for_doctor = service.list(&doctor).await.unwrap();
        assert_eq!(for_doctor[0].patient_name.as_deref(), Some("Pat"));

        let stranger = fx.patient("Sam").await;
        assert!(service.list(&stranger).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_patient_cannot_prescribe() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let err = fx
            .prescription_service()
            .create(&patient, amoxicillin(patient.user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_prescription_for_non_patient_is_not_found() {
        let fx = Fixture::new();
        let doctor = fx.doctor("Dr. D").await;
        let colleague = fx.doctor("Dr. E").await;
        let err = fx
            .prescription_service()
            .create(&doctor, amoxicillin(colleague.user_id))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_medicine_is_rejected() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let doctor = fx.doctor("Dr. D").await;
        let mut request = amoxicillin(patient.user_id);
        request.medicine = String::new();

        assert!(matches!(
            fx.prescription_service().create(&doctor, request).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
