use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use care_link_data::models::message::NewMessage;
use care_link_data::repository::{MessageRepositoryTrait, UserRepositoryTrait};

use crate::auth::authorize::{Action, Authorizer, Resource, ResourceKind};
use crate::auth::Principal;
use crate::entities::conversions::convert_to_domain_message;
use crate::entities::{Message, SendMessageRequest};
use crate::services::{validate_request, ServiceError};

#[async_trait]
pub trait MessageServiceTrait: Send + Sync {
    /// Every message the caller sent or received, newest first.
    /// Selecting only rows with the caller on one side is the access check.
    async fn list(&self, principal: &Principal) -> Result<Vec<Message>, ServiceError>;

    async fn send(&self, principal: &Principal, request: SendMessageRequest) -> Result<Message, ServiceError>;

    /// Both directions between the caller and another user, oldest first.
    /// Only rows with the caller on one side are selected, so no further check applies.
    async fn chat_history(&self, principal: &Principal, other_user_id: i64) -> Result<Vec<Message>, ServiceError>;

    async fn mark_read(&self, principal: &Principal, id: i64) -> Result<Message, ServiceError>;
}

pub struct MessageService {
    messages: Arc<dyn MessageRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    authorizer: Authorizer,
}

impl MessageService {
    pub fn new(
        messages: Arc<dyn MessageRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        authorizer: Authorizer,
    ) -> Self {
        Self { messages, users, authorizer }
    }
}

#[async_trait]
impl MessageServiceTrait for MessageService {
    async fn list(&self, principal: &Principal) -> Result<Vec<Message>, ServiceError> {
        let rows = self.messages.list_for_user(principal.user_id).await?;
        Ok(rows.into_iter().map(convert_to_domain_message).collect())
    }

    async fn send(&self, principal: &Principal, request: SendMessageRequest) -> Result<Message, ServiceError> {
        validate_request(&request)?;

        let resource = Resource::Message {
            sender_id: principal.user_id,
            receiver_id: request.receiver_id,
        };
        self.authorizer.enforce(principal, Action::Create, &resource).await?;

        if self.users.find_by_id(request.receiver_id).await?.is_none() {
            return Err(ServiceError::NotFound(format!("User {} not found", request.receiver_id)));
        }

        let row = self
            .messages
            .create(NewMessage {
                sender_id: principal.user_id,
                receiver_id: request.receiver_id,
                message: request.message,
            })
            .await?;

        info!("Message {} sent from {} to {}", row.id, row.sender_id, row.receiver_id);
        Ok(convert_to_domain_message(row))
    }

    async fn chat_history(&self, principal: &Principal, other_user_id: i64) -> Result<Vec<Message>, ServiceError> {
        let rows = self.messages.conversation(principal.user_id, other_user_id).await?;
        Ok(rows.into_iter().map(convert_to_domain_message).collect())
    }

    async fn mark_read(&self, principal: &Principal, id: i64) -> Result<Message, ServiceError> {
        let row = self.messages.find_by_id(id).await?;
        self.authorizer
            .enforce_existing(principal, Action::Update, ResourceKind::Message, row, |m| Resource::Message {
                sender_id: m.sender_id,
                receiver_id: m.receiver_id,
            })
            .await?;

        let row = self
            .messages
            .mark_read(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Message {} not found", id)))?;
        Ok(convert_to_domain_message(row))
    }
}
