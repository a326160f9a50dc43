use std::cmp::Ordering;
use std::sync::Arc;

use uuid::Uuid;

use crate::api::error;
use crate::modules::message::{
    model::ConversationSummary, repository::MessageRepository, schema::MessageEntity,
};

/// Derives a viewer's conversation list from the message store: group the
/// viewer's messages by counterpart, keep each group's latest message, and
/// count the messages from that counterpart the viewer has not read. One
/// summary per counterpart, most recent conversation first.
#[derive(Clone)]
pub struct ConversationAggregator<M>
where
    M: MessageRepository + Send + Sync,
{
    message_repo: Arc<M>,
}

impl<M> ConversationAggregator<M>
where
    M: MessageRepository + Send + Sync,
{
    pub fn new(message_repo: Arc<M>) -> Self {
        ConversationAggregator { message_repo }
    }

    pub async fn list_conversations(
        &self,
        viewer_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, error::SystemError> {
        let counterparts = self.message_repo.distinct_counterparts(&viewer_id).await?;

        let mut summaries = Vec::with_capacity(counterparts.len());
        for counterpart in counterparts {
            let (last_message, unread_count) = tokio::try_join!(
                self.message_repo.latest_between(&viewer_id, &counterpart),
                self.message_repo.count_unread_from(&viewer_id, &counterpart),
            )?;

            // The conversation may be deleted between the two reads; a
            // counterpart without messages never gets a summary.
            if let Some(last_message) = last_message {
                summaries.push(ConversationSummary { counterpart, last_message, unread_count });
            }
        }

        summaries.sort_by(|a, b| latest_first(&a.last_message, &b.last_message));

        Ok(summaries)
    }
}

/// Recency order for messages: `created_at` descending, `id` descending on
/// equal timestamps. Repeated aggregation over the same data yields the
/// same order.
pub fn latest_first(a: &MessageEntity, b: &MessageEntity) -> Ordering {
    b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id))
}
