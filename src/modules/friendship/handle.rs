use actix_web::{delete, get, post, put, web, HttpRequest};
use uuid::Uuid;

use crate::{
    api::{error, success},
    middlewares::get_identity,
    modules::{
        friendship::{
            model::{FriendRequestResponse, FriendsPage, RespondAction, RespondBody},
            repository_pg::FriendshipRepositoryPg,
            schema::FriendshipEntity,
            service::FriendshipService,
        },
        user::repository_pg::UserRepositoryPg,
    },
    utils::{PageQuery, ValidatedQuery},
};

pub type FriendshipSvc = FriendshipService<FriendshipRepositoryPg, UserRepositoryPg>;

#[post("/{user_id}/request")]
pub async fn send_request(
    friendship_service: web::Data<FriendshipSvc>,
    target_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<FriendshipEntity>, error::Error> {
    let requester_id = get_identity(&req)?.user_id;
    let request = friendship_service.send_request(requester_id, *target_id).await?;

    Ok(success::Success::created(Some(request)).message("Friend request sent successfully"))
}

#[put("/{request_id}/respond")]
pub async fn respond_to_request(
    friendship_service: web::Data<FriendshipSvc>,
    request_id: web::Path<Uuid>,
    body: web::Json<RespondBody>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let responder_id = get_identity(&req)?.user_id;
    friendship_service.respond(responder_id, *request_id, body.action).await?;

    let message = match body.action {
        RespondAction::Accept => "Friend request accepted successfully",
        RespondAction::Reject => "Friend request rejected successfully",
    };
    Ok(success::Success::ok(None).message(message))
}

#[delete("/{request_id}/cancel")]
pub async fn cancel_request(
    friendship_service: web::Data<FriendshipSvc>,
    request_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let caller_id = get_identity(&req)?.user_id;
    friendship_service.cancel(caller_id, *request_id).await?;

    Ok(success::Success::ok(None).message("Friend request cancelled successfully"))
}

#[delete("/{friendship_id}/remove")]
pub async fn remove_friend(
    friendship_service: web::Data<FriendshipSvc>,
    friendship_id: web::Path<Uuid>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let caller_id = get_identity(&req)?.user_id;
    friendship_service.remove(caller_id, *friendship_id).await?;

    Ok(success::Success::ok(None).message("Friend removed successfully"))
}

#[get("/requests")]
pub async fn list_requests(
    friendship_service: web::Data<FriendshipSvc>,
    req: HttpRequest,
) -> Result<success::Success<Vec<FriendRequestResponse>>, error::Error> {
    let user_id = get_identity(&req)?.user_id;
    let requests = friendship_service.list_requests(user_id).await?;

    Ok(success::Success::ok(Some(requests)).message("Friend requests retrieved successfully"))
}

#[get("/user/{user_id}")]
pub async fn list_friends(
    friendship_service: web::Data<FriendshipSvc>,
    user_id: web::Path<Uuid>,
    query: ValidatedQuery<PageQuery>,
    req: HttpRequest,
) -> Result<success::Success<FriendsPage>, error::Error> {
    get_identity(&req)?;
    let (page, limit) = query.0.resolve();
    let friends = friendship_service.list_friends(*user_id, page, limit).await?;

    Ok(success::Success::ok(Some(friends)).message("Friends retrieved successfully"))
}
