use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use care_link_data::models::reminder::{NewReminder, ReminderRow};
use care_link_data::repository::ReminderRepositoryTrait;

use crate::auth::authorize::{Action, Authorizer, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::{convert_to_data_reminder_changes, convert_to_domain_reminder};
use crate::entities::{CreateReminderRequest, Reminder, UpdateReminderRequest};
use crate::services::{validate_request, ServiceError};

#[async_trait]
pub trait ReminderServiceTrait: Send + Sync {
    /// Active reminders of the caller, by time of day
    /// The owner filter in the query is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<Reminder>, ServiceError>;

    async fn create(&self, principal: &Principal, request: CreateReminderRequest) -> Result<Reminder, ServiceError>;

    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateReminderRequest,
    ) -> Result<Reminder, ServiceError>;

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError>;
}

pub struct ReminderService {
    reminders: Arc<dyn ReminderRepositoryTrait>,
    authorizer: Authorizer,
}

impl ReminderService {
    pub fn new(reminders: Arc<dyn ReminderRepositoryTrait>, authorizer: Authorizer) -> Self {
        Self { reminders, authorizer }
    }

    async fn load(&self, principal: &Principal, action: Action, id: i64) -> Result<ReminderRow, ServiceError> {
        let row = self.reminders.find_by_id(id).await?;
        self.authorizer
            .enforce_existing(principal, action, ResourceKind::Reminder, row, |r| Resource::Reminder {
                user_id: r.user_id,
            })
            .await
    }
}

pub(crate) fn to_reminders(rows: Vec<ReminderRow>) -> Result<Vec<Reminder>, ServiceError> {
    rows.into_iter()
        .map(convert_to_domain_reminder)
        .collect::<Result<Vec<_>, _>>()
        .map_err(ServiceError::Internal)
}

#[async_trait]
impl ReminderServiceTrait for ReminderService {
    async fn list(&self, principal: &Principal) -> Result<Vec<Reminder>, ServiceError> {
        to_reminders(self.reminders.list_active_for_user(principal.user_id).await?)
    }

    async fn create(&self, principal: &Principal, request: CreateReminderRequest) -> Result<Reminder, ServiceError> {
        validate_request(&request)?;
        self.authorizer
            .enforce(principal, Action::Create, &Resource::Reminder { user_id: principal.user_id })
            .await?;

        let row = self
            .reminders
            .create(NewReminder {
                user_id: principal.user_id,
                reminder_type: request.reminder_type.as_str().to_string(),
                title: request.title,
                time: request.time,
                is_active: request.is_active.unwrap_or(true),
            })
            .await?;

        info!("Reminder {} created for user {}", row.id, row.user_id);
        convert_to_domain_reminder(row).map_err(ServiceError::Internal)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: i64,
        request: UpdateReminderRequest,
    ) -> Result<Reminder, ServiceError> {
        validate_request(&request)?;
        self.load(principal, Action::Update, id).await?;

        let row = self
            .reminders
            .update(id, convert_to_data_reminder_changes(request))
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Reminder {} not found", id)))?;

        info!("Reminder {} updated", id);
        convert_to_domain_reminder(row).map_err(ServiceError::Internal)
    }

    async fn delete(&self, principal: &Principal, id: i64) -> Result<(), ServiceError> {
        self.load(principal, Action::Delete, id).await?;
        if !self.reminders.delete(id).await? {
            return Err(ServiceError::NotFound(format!("Reminder {} not found", id)));
        }
        info!("Reminder {} deleted", id);
        Ok(())
    }
}
