use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::modules::message::schema::{MediaType, MessageEntity};

#[derive(Debug, Clone)]
pub struct InsertMessage {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub content: String,
    pub media_type: MediaType,
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageBody {
    pub recipient_id: Uuid,
    pub content: String,
    pub media_type: Option<MediaType>,
    #[validate(url)]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPage {
    pub messages: Vec<MessageEntity>,
    pub page: i64,
    pub pages: i64,
    pub total: i64,
}

/// Derived view of one conversation: the counterpart, the most recent
/// message between the two, and how many of their messages the viewer has
/// not read yet. Never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub counterpart: Uuid,
    pub last_message: MessageEntity,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConversationResponse {
    pub deleted: u64,
}
