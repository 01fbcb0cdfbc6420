use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use care_link_data::models::medication::{MedicationRow, NewMedication};
use care_link_data::repository::MedicationRepositoryTrait;

use crate::auth::authorize::{Action, Authorizer, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::{convert_to_data_medication_changes, convert_to_domain_medication};
use crate::entities::{CreateMedicationRequest, Medication, UpdateMedicationRequest};
use crate::services::{validate_request, ServiceError};

#[async_trait]
pub trait MedicationServiceTrait: Send + Sync {
    /// The caller's medications. The query filters on the caller's id, which is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<Medication>, ServiceError>;

    async fn get(&self, principal: &Principal, id: i64) -> Result<Medication, ServiceError>;

    async fn create(&self, principal: &Principal, request: CreateMedicationRequest)
        -> Result<Medication, ServiceError>;

    /// Apply only the fields present in the request
    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError>;

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError>;
}

pub struct MedicationService {
    medications: Arc<dyn MedicationRepositoryTrait>,
    authorizer: Authorizer,
}

impl MedicationService {
    pub fn new(medications: Arc<dyn MedicationRepositoryTrait>, authorizer: Authorizer) -> Self {
        Self { medications, authorizer }
    }

    async fn load(&self, principal: &Principal, action: Action, id: i64) -> Result<MedicationRow, ServiceError> {
        let row = self.medications.find_by_id(id).await?;
        self.authorizer
            .enforce_existing(principal, action, ResourceKind::Medication, row, |m| Resource::Medication {
                user_id: m.user_id,
            })
            .await
    }
}

#[async_trait]
impl MedicationServiceTrait for MedicationService {
    async fn list(&self, principal: &Principal) -> Result<Vec<Medication>, ServiceError> {
        let rows = self.medications.list_for_user(principal.user_id).await?;
        Ok(rows.into_iter().map(convert_to_domain_medication).collect())
    }

    async fn get(&self, principal: &Principal, id: i64) -> Result<Medication, ServiceError> {
        let row = self.load(principal, Action::Read, id).await?;
        Ok(convert_to_domain_medication(row))
    }

    async fn create(
        &self,
        principal: &Principal,
        request: CreateMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        validate_request(&request)?;
        self.authorizer
            .enforce(principal, Action::Create, &Resource::Medication { user_id: principal.user_id })
            .await?;

        let row = self
            .medications
            .create(NewMedication {
                user_id: principal.user_id,
                name: request.name,
                dosage: request.dosage,
                time: request.time,
                total_tablets: request.total_tablets,
                remaining_tablets: request.remaining_tablets,
            })
            .await?;

        info!("Medication {} added for user {}", row.id, row.user_id);
        Ok(convert_to_domain_medication(row))
    }

    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateMedicationRequest,
    ) -> Result<Medication, ServiceError> {
        validate_request(&request)?;
        self.load(principal, Action::Update, id).await?;

        let row = self
            .medications
            .update(id, convert_to_data_medication_changes(request))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Medication {} not found", id)))?;

        info!("Medication {} updated, {} tablets remaining", id, row.remaining_tablets);
        Ok(convert_to_domain_medication(row))
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        self.load(principal, Action::Delete, id).await?;
        if !self.medications.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Medication {} not found", id)));
        }
        info!("Medication {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::StockLevel;
    use crate::testing::Fixture;

    fn metformin(remaining: i64) -> CreateMedicationRequest {
        CreateMedicationRequest {
            name: "Metformin".to_string(),
            dosage: "500mg".to_string(),
            time: "08:00".to_string(),
            total_tablets: 60,
            remaining_tablets: remaining,
        }
    }

    #[tokio::test]
    async fn test_list_only_returns_own_medications() {
        let fx = Fixture::new();
        let pat = fx.patient("Pat").await;
        let sam = fx.patient("Sam").await;
        let doctor = fx.doctor("Dr. D").await;
        let service = fx.medication_service();
        let own = service.create(&pat, metformin(30)).await.unwrap();
        service.create(&sam, metformin(12)).await.unwrap();

        let listed = service.list(&pat).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, own.id);
        assert!(service.list(&doctor).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let service = fx.medication_service();
        let created = service.create(&patient, metformin(25)).await.unwrap();
        assert_eq!(created.stock_level, StockLevel::High);

        let updated = service
            .update(
                &patient,
                created.id,
                UpdateMedicationRequest {
                    remaining_tablets: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.remaining_tablets, 4);
        assert_eq!(updated.stock_level, StockLevel::Critical);
        assert_eq!(updated.name, "Metformin");
        assert_eq!(updated.dosage, "500mg");
        assert_eq!(updated.time, "08:00");
        assert_eq!(updated.total_tablets, 60);
    }

    #[tokio::test]
    async fn test_other_users_cannot_touch_medication() {
        let fx = Fixture::new();
        let owner = fx.patient("Pat").await;
        let other = fx.patient("Sam").await;
        let doctor = fx.doctor("Dr. D").await;
        fx.book(&owner, &doctor).await;
        let service = fx.medication_service();
        let created = service.create(&owner, metformin(12)).await.unwrap();

        for intruder in [&other, &doctor] {
            assert!(matches!(
                service.get(intruder, created.id).await,
                Err(ServiceError::Forbidden(_))
            ));
            assert!(matches!(
                service.delete(intruder, created.id).await,
                Err(ServiceError::Forbidden(_))
            ));
        }
        assert_eq!(service.get(&owner, created.id).await.unwrap().stock_level, StockLevel::Medium);
    }

    #[tokio::test]
    async fn test_doctor_cannot_add_medication() {
        let fx = Fixture::new();
        let doctor = fx.doctor("Dr. D").await;
        assert!(matches!(
            fx.medication_service().create(&doctor, metformin(10)).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_time_is_rejected() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let mut request = metformin(10);
        request.time = "25:00".to_string();
        assert!(matches!(
            fx.medication_service().create(&patient, request).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let fx = Fixture::new();
        let patient = fx.patient("Pat").await;
        let service = fx.medication_service();
        let created = service.create(&patient, metformin(10)).await.unwrap();

        service.delete(&patient, created.id).await.unwrap();
        assert!(matches!(
            service.get(&patient, created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
