use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use care_link_data::models::health_record::{HealthRecordRow, NewHealthRecord};
use care_link_data::repository::HealthRecordRepositoryTrait;

use crate::auth::authorize::{Action, Authorizer, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_health_record;
use crate::entities::{HealthRecord, Role, UploadHealthRecord};
use crate::services::ServiceError;
use crate::storage::DocumentStore;

const MAX_TITLE_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 2000;

#[async_trait]
pub trait HealthRecordServiceTrait: Send + Sync {
    /// The calling patient's records, newest first
    async fn list(&self, principal: &Principal) -> Result<Vec<HealthRecord>, ServiceError>;

    /// Whether the caller may upload at all. Cheap enough to run before the body is read.
    async fn authorize_upload(&self, principal: &Principal) -> Result<(), ServiceError>;

    /// Store the file in its bucket and record where it went
    async fn upload(&self, principal: &Principal, upload: UploadHealthRecord) -> Result<HealthRecord, ServiceError>;

    /// Remove the record and its stored file
    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError>;
}

pub struct HealthRecordService {
    records: Arc<dyn HealthRecordRepositoryTrait>,
    documents: Arc<dyn DocumentStore>,
    authorizer: Authorizer,
}

impl HealthRecordService {
    pub fn new(
        records: Arc<dyn HealthRecordRepositoryTrait>,
        documents: Arc<dyn DocumentStore>,
        authorizer: Authorizer,
    ) -> Self {
        Self { records, documents, authorizer }
    }

    fn check_upload(&self, upload: &UploadHealthRecord) -> Result<String, ServiceError> {
        if upload.content.is_empty() {
            return Err(ServiceError::Validation("Uploaded file is empty".to_string()));
        }
        if upload.content.len() > self.documents.max_file_size() {
            return Err(ServiceError::Validation(format!(
                "File exceeds the maximum size of {} bytes",
                self.documents.max_file_size()
            )));
        }

        let title = match upload.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => upload.original_filename.clone(),
        };
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ServiceError::Validation(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LEN
            )));
        }
        if upload.notes.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTES_LEN) {
            return Err(ServiceError::Validation(format!(
                "Notes cannot exceed {} characters",
                MAX_NOTES_LEN
            )));
        }
        Ok(title)
    }
}

pub(crate) fn to_health_records(rows: Vec<HealthRecordRow>) -> Result<Vec<HealthRecord>, ServiceError> {
    rows.into_iter()
        .map(convert_to_domain_health_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::Internal)
}

#[async_trait]
impl HealthRecordServiceTrait for HealthRecordService {
    async fn list(&self, principal: &Principal) -> Result<Vec<HealthRecord>, ServiceError> {
        self.authorizer.require_role(principal, Role::Patient, "health record list")?;
        to_health_records(self.records.list_for_patient(principal.user_id).await?)
    }

    async fn authorize_upload(&self, principal: &Principal) -> Result<(), ServiceError> {
        self.authorizer
            .enforce(principal, Action::Create, &Resource::HealthRecord { patient_id: principal.user_id })
            .await
    }

    async fn upload(&self, principal: &Principal, upload: UploadHealthRecord) -> Result<HealthRecord, ServiceError> {
        self.authorize_upload(principal).await?;
        let title = self.check_upload(&upload)?;

        let stored = self
            .documents
            .store(principal.user_id, upload.record_type, &upload.original_filename, &upload.content)
            .await
            .map_err(|e| {
                error!("Failed to store upload for user {}: {}", principal.user_id, e);
                ServiceError::Internal("Could not store the uploaded file".to_string())
            })?;

        let created = self
            .records
            .create(NewHealthRecord {
                patient_id: principal.user_id,
                record_type: upload.record_type.as_str().to_string(),
                title,
                file_url: stored.public_path.clone(),
                notes: upload.notes.filter(|n| !n.trim().is_empty()),
            })
            .await;

        let row = match created {
            Ok(row) => row,
            Err(e) => {
                if let Err(cleanup) = self.documents.remove(&stored.public_path).await {
                    warn!("Could not remove orphaned upload {}: {}", stored.public_path, cleanup);
                }
                return Err(e.into());
            }
        };

        info!(
            "Health record {} uploaded by patient {} to {}",
            row.id, row.patient_id, row.file_url
        );
        convert_to_domain_health_record(row).map_err(ServiceError::Internal)
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        let row = self.records.find_by_id(id).await?;
        let row = self
            .authorizer
            .enforce_existing(principal, Action::Delete, ResourceKind::HealthRecord, row, |r| {
                Resource::HealthRecord { patient_id: r.patient_id }
            })
            .await?;

        if !self.records.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Health record {} not found", id)));
        }
        if let Err(e) = self.documents.remove(&row.file_url).await {
            warn!("Health record {} deleted but its file was not: {}", id, e);
        }
        info!("Health record {} deleted by patient {}", id, principal.user_id);
        Ok(())
    }
}
