use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    constants::MAX_MESSAGE_LENGTH,
    modules::{
        friendship::{repository::FriendshipRepository, service::FriendshipService},
        message::{
            aggregator::ConversationAggregator,
            model::{ConversationSummary, InsertMessage, ThreadPage},
            repository::MessageRepository,
            schema::{MediaType, MessageEntity},
        },
        user::repository::UserRepository,
    },
    utils::page_count,
};

/// Orchestrates the messaging flows. Sends are gated by the friendship
/// state machine; conversation listing is delegated to the aggregator.
#[derive(Clone)]
pub struct MessagingService<M, R, U>
where
    M: MessageRepository + Send + Sync,
    R: FriendshipRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    message_repo: Arc<M>,
    friendship_service: FriendshipService<R, U>,
    user_repo: Arc<U>,
    aggregator: ConversationAggregator<M>,
}

impl<M, R, U> MessagingService<M, R, U>
where
    M: MessageRepository + Send + Sync,
    R: FriendshipRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(
        message_repo: Arc<M>,
        friendship_service: FriendshipService<R, U>,
        user_repo: Arc<U>,
    ) -> Self {
        let aggregator = ConversationAggregator::new(message_repo.clone());
        MessagingService { message_repo, friendship_service, user_repo, aggregator }
    }

    pub async fn send(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: String,
        media_type: Option<MediaType>,
        media_url: Option<String>,
    ) -> Result<MessageEntity, error::SystemError> {
        if sender_id == recipient_id {
            return Err(error::SystemError::bad_request("Cannot send a message to yourself"));
        }

        if self.user_repo.find_by_id(&recipient_id).await?.is_none() {
            return Err(error::SystemError::not_found("Recipient not found"));
        }

        if !self.friendship_service.is_authorized_to_message(&sender_id, &recipient_id).await? {
            return Err(error::SystemError::forbidden(
                "You can only message users on your friends list",
            ));
        }

        let content = content.trim();
        if content.is_empty() {
            return Err(error::SystemError::bad_request("Message content cannot be empty"));
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(error::SystemError::bad_request("Message content is too long"));
        }

        let media_type = media_type.unwrap_or(MediaType::None);
        match (media_type, &media_url) {
            (MediaType::None, Some(_)) => {
                return Err(error::SystemError::bad_request(
                    "A media URL requires a media type",
                ));
            }
            (MediaType::None, None) => {}
            (_, None) => {
                return Err(error::SystemError::bad_request(
                    "A media URL is required for media messages",
                ));
            }
            (_, Some(_)) => {}
        }

        self.message_repo
            .insert(&InsertMessage {
                sender_id,
                recipient_id,
                content: content.to_string(),
                media_type,
                media_url,
            })
            .await
    }

    /// One page of the pair's thread in chronological order, marking every
    /// unread counterpart->viewer message read as a side effect. Messages in
    /// the returned page keep the read state observed before the flip.
    pub async fn fetch_thread(
        &self,
        viewer_id: Uuid,
        counterpart_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<ThreadPage, error::SystemError> {
        let (mut messages, total) = tokio::try_join!(
            self.message_repo.find_between(&viewer_id, &counterpart_id, page, page_size),
            self.message_repo.count_between(&viewer_id, &counterpart_id),
        )?;

        self.message_repo.mark_read_bulk(&counterpart_id, &viewer_id).await?;

        // Storage order is newest-first; pages render oldest -> newest.
        messages.reverse();

        Ok(ThreadPage { messages, page, pages: page_count(total, page_size), total })
    }

    pub async fn list_conversations(
        &self,
        viewer_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, error::SystemError> {
        self.aggregator.list_conversations(viewer_id).await
    }

    pub async fn unread_count(&self, viewer_id: Uuid) -> Result<i64, error::SystemError> {
        self.message_repo.count_unread_for_recipient(&viewer_id).await
    }

    pub async fn mark_thread_read(
        &self,
        viewer_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<u64, error::SystemError> {
        self.message_repo.mark_read_bulk(&counterpart_id, &viewer_id).await
    }

    pub async fn delete_message(
        &self,
        actor_id: Uuid,
        message_id: Uuid,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = self
            .message_repo
            .find_by_id(&message_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Message not found"))?;

        if message.sender_id != actor_id && message.recipient_id != actor_id {
            return Err(error::SystemError::forbidden(
                "You can only delete messages from your own conversations",
            ));
        }

        if !self.message_repo.delete_by_id(&message_id).await? {
            return Err(error::SystemError::not_found("Message not found"));
        }

        Ok(message)
    }

    /// Bulk delete of both directions of the conversation. Unread messages
    /// go with it; there is no read-state precondition.
    pub async fn delete_conversation(
        &self,
        actor_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<u64, error::SystemError> {
        self.message_repo.delete_between(&actor_id, &counterpart_id).await
    }
}
