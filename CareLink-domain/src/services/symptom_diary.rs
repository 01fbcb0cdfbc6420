use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use care_link_data::models::symptom_diary::NewSymptomEntry;
use care_link_data::repository::SymptomDiaryRepositoryTrait;

use crate::auth::authorize::{Action, Authorizer, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_symptom_entry;
use crate::entities::{CreateSymptomEntryRequest, SymptomEntry};
use crate::services::{validate_request, ServiceError};

#[async_trait]
pub trait SymptomDiaryServiceTrait: Send + Sync {
    /// The caller's own entries, newest first. The owner filter in the query is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<SymptomEntry>, ServiceError>;

    async fn create(
        &self,
        principal: &Principal,
        request: CreateSymptomEntryRequest,
    ) -> Result<SymptomEntry, ServiceError>;

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError>;
}

pub struct SymptomDiaryService {
    entries: Arc<dyn SymptomDiaryRepositoryTrait>,
    authorizer: Authorizer,
}

impl SymptomDiaryService {
    pub fn new(entries: Arc<dyn SymptomDiaryRepositoryTrait>, authorizer: Authorizer) -> Self {
        Self { entries, authorizer }
    }
}

#[async_trait]
impl SymptomDiaryServiceTrait for SymptomDiaryService {
    async fn list(&self, principal: &Principal) -> Result<Vec<SymptomEntry>, ServiceError> {
        let rows = self.entries.list_for_user(principal.user_id, None).await?;
        Ok(rows.into_iter().map(convert_to_domain_symptom_entry).collect())
    }

    async fn create(
        &self,
        principal: &Principal,
        request: CreateSymptomEntryRequest,
    ) -> Result<SymptomEntry, ServiceError> {
        validate_request(&request)?;
        self.authorizer
            .enforce(principal, Action::Create, &Resource::SymptomDiary { user_id: principal.user_id })
            .await?;

        let row = self
            .entries
            .create(NewSymptomEntry {
                user_id: principal.user_id,
                date: request.date.unwrap_or_else(Utc::now),
                symptoms: request.symptoms,
                severity: request.severity,
                notes: request.notes,
            })
            .await?;

        info!("Symptom entry {} recorded for user {} (severity {})", row.id, row.user_id, row.severity);
        Ok(convert_to_domain_symptom_entry(row))
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        let row = self.entries.find_by_id(id).await?;
        self.authorizer
            .enforce_existing(principal, Action::Delete, ResourceKind::SymptomDiary, row, |e| {
                Resource::SymptomDiary { user_id: e.user_id }
            })
            .await?;

        if !self.entries.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Symptom diary entry {} not found", id)));
        }
        info!("Symptom entry {} deleted", id);
        Ok(())
    }
}
