use uuid::Uuid;

use crate::api::error;
use crate::modules::message::{model::InsertMessage, schema::MessageEntity};

/// Message storage, indexed by participant pair and by recipient+read
/// state. Retrieval order is always `created_at` descending with `id`
/// descending breaking timestamp ties.
#[async_trait::async_trait]
pub trait MessageRepository {
    async fn insert(&self, message: &InsertMessage)
        -> Result<MessageEntity, error::SystemError>;

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    async fn count_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<i64, error::SystemError>;

    async fn latest_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError>;

    /// Single atomic bulk update flipping every unread sender->recipient
    /// message to read. Returns the number of rows flipped.
    async fn mark_read_bulk(
        &self,
        sender_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError>;

    async fn count_unread_for_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<i64, error::SystemError>;

    async fn count_unread_from(
        &self,
        recipient_id: &Uuid,
        sender_id: &Uuid,
    ) -> Result<i64, error::SystemError>;

    /// Everyone the user has exchanged at least one message with.
    async fn distinct_counterparts(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError>;

    async fn delete_by_id(&self, message_id: &Uuid) -> Result<bool, error::SystemError>;

    /// Deletes both directions of the pair's conversation. Returns the
    /// number of messages removed.
    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError>;
}
