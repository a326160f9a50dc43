use actix_web::{delete, get, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_identity,
    modules::{
        friendship::repository_pg::FriendshipRepositoryPg,
        message::{
            model::{
                ConversationSummary, DeletedConversationResponse, MarkReadResponse,
                SendMessageBody, ThreadPage, UnreadCountResponse,
            },
            repository_pg::MessageRepositoryPg,
            schema::MessageEntity,
            service::MessagingService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{PageQuery, ValidatedJson, ValidatedQuery},
};

pub type MessagingSvc =
    MessagingService<MessageRepositoryPg, FriendshipRepositoryPg, UserRepositoryPg>;

#[post("")]
pub async fn send_message(
    messaging_service: web::Data<MessagingSvc>,
    body: ValidatedJson<SendMessageBody>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let sender_id = get_identity(&req)?.user_id;
    let body = body.0;
    let message = messaging_service
        .send(sender_id, body.recipient_id, body.content, body.media_type, body.media_url)
        .await?;

    Ok(success::Success::created(Some(message)).message("Message sent successfully"))
}

#[get("")]
pub async fn list_conversations(
    messaging_service: web::Data<MessagingSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<ConversationSummary>>, error::Error> {
    let viewer_id = get_identity(&req)?.user_id;
    let conversations = messaging_service.list_conversations(viewer_id).await?;

    Ok(success::Success::ok(Some(conversations)).message("Conversations retrieved successfully"))
}

#[get("/unread/count")]
pub async fn unread_count(
    messaging_service: web::Data<MessagingSvc>,
    req: HttpRequest,
) -> Result<success::Success<UnreadCountResponse>, error::Error> {
    let viewer_id = get_identity(&req)?.user_id;
    let unread_count = messaging_service.unread_count(viewer_id).await?;

    Ok(success::Success::ok(Some(UnreadCountResponse { unread_count })))
}

#[get("/{user_id}")]
pub async fn fetch_thread(
    messaging_service: web::Data<MessagingSvc>,
    counterpart_id: web::Path<Uuid>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<ThreadPage>, error::Error> {
    let viewer_id = get_identity(&req)?.user_id;
    let (page, limit) = query.0.resolve();
    let thread = messaging_service.fetch_thread(viewer_id, *counterpart_id, page, limit).await?;

    Ok(success::Success::ok(Some(thread)).message("Messages retrieved successfully"))
}

#[put("/{user_id}/read")]
pub async fn mark_thread_read(
    messaging_service: web::Data<MessagingSvc>,
    counterpart_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MarkReadResponse>, error::Error> {
    let viewer_id = get_identity(&req)?.user_id;
    let updated = messaging_service.mark_thread_read(viewer_id, *counterpart_id).await?;

    Ok(success::Success::ok(Some(MarkReadResponse { updated }))
        .message("Conversation marked as read"))
}

#[delete("/conversation/{user_id}")]
pub async fn delete_conversation(
    messaging_service: web::Data<MessagingSvc>,
    counterpart_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<DeletedConversationResponse>, error::Error> {
    let actor_id = get_identity(&req)?.user_id;
    let deleted = messaging_service.delete_conversation(actor_id, *counterpart_id).await?;

    Ok(success::Success::ok(Some(DeletedConversationResponse { deleted }))
        .message("Conversation deleted successfully"))
}

#[delete("/{message_id}")]
pub async fn delete_message(
    messaging_service: web::Data<MessagingSvc>,
    message_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<MessageEntity>, error::Error> {
    let actor_id = get_identity(&req)?.user_id;
    let message = messaging_service.delete_message(actor_id, *message_id).await?;

    Ok(success::Success::ok(Some(message)).message("Message deleted successfully"))
}
