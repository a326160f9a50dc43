use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    api::error,
    modules::{
        friendship::{
            model::{FriendInfo, FriendRequestResponse, FriendsPage, RespondAction},
            repository::FriendshipRepository,
            schema::{FriendshipEntity, FriendshipStatus},
        },
        user::repository::UserRepository,
    },
    utils::page_count,
};

/// The friendship state machine: none -> pending -> accepted, with reject,
/// cancel and remove deleting the record. The sole authorizer of
/// "can A message B".
#[derive(Clone)]
pub struct FriendshipService<R, U>
where
    R: FriendshipRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    friendship_repo: Arc<R>,
    user_repo: Arc<U>,
}

impl<R, U> FriendshipService<R, U>
where
    R: FriendshipRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(friendship_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        FriendshipService { friendship_repo, user_repo }
    }

    pub async fn send_request(
        &self,
        requester_id: Uuid,
        target_id: Uuid,
    ) -> Result<FriendshipEntity, error::SystemError> {
        if requester_id == target_id {
            return Err(error::SystemError::bad_request(
                "Cannot send a friend request to yourself",
            ));
        }

        if self.user_repo.find_by_id(&target_id).await?.is_none() {
            return Err(error::SystemError::not_found("Target user not found"));
        }

        if let Some(existing) = self.friendship_repo.find_by_pair(&requester_id, &target_id).await?
        {
            return Err(match existing.status {
                FriendshipStatus::Accepted => {
                    error::SystemError::conflict("Users are already friends")
                }
                FriendshipStatus::Blocked => {
                    error::SystemError::conflict("This relationship is unavailable")
                }
                FriendshipStatus::Pending if existing.action_user == requester_id => {
                    error::SystemError::conflict("Friend request already sent")
                }
                FriendshipStatus::Pending => {
                    error::SystemError::conflict("This user has already sent you a friend request")
                }
            });
        }

        // The unique constraint on the canonical pair settles concurrent
        // requests; a loser surfaces here as a conflict, not a duplicate row.
        self.friendship_repo.insert_pending(&requester_id, &target_id).await.map_err(|e| match e {
            error::SystemError::Conflict(_) => {
                error::SystemError::conflict("A relationship between these users already exists")
            }
            other => other,
        })
    }

    pub async fn respond(
        &self,
        responder_id: Uuid,
        request_id: Uuid,
        action: RespondAction,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friendship_repo
            .find_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if !request.involves(&responder_id) {
            return Err(error::SystemError::forbidden(
                "You are not a party to this friend request",
            ));
        }

        if request.action_user == responder_id {
            return Err(error::SystemError::forbidden(
                "You cannot respond to your own friend request",
            ));
        }

        if request.status != FriendshipStatus::Pending {
            return Err(error::SystemError::conflict("Friend request already processed"));
        }

        // Guarded one-shot transitions: the status condition travels inside
        // the statement, so a concurrent responder loses cleanly.
        let applied = match action {
            RespondAction::Accept => {
                self.friendship_repo.accept_if_pending(&request_id, &responder_id).await?
            }
            RespondAction::Reject => self.friendship_repo.delete_if_pending(&request_id).await?,
        };

        if !applied {
            return Err(error::SystemError::conflict("Friend request already processed"));
        }

        Ok(())
    }

    pub async fn cancel(
        &self,
        caller_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let request = self
            .friendship_repo
            .find_by_id(&request_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friend request not found"))?;

        if request.action_user != caller_id {
            return Err(error::SystemError::forbidden(
                "Only the requester can cancel a friend request",
            ));
        }

        if request.status != FriendshipStatus::Pending {
            return Err(error::SystemError::conflict("Friend request already processed"));
        }

        if !self.friendship_repo.delete_if_pending(&request_id).await? {
            return Err(error::SystemError::conflict("Friend request already processed"));
        }

        Ok(())
    }

    pub async fn remove(
        &self,
        caller_id: Uuid,
        friendship_id: Uuid,
    ) -> Result<(), error::SystemError> {
        let friendship = self
            .friendship_repo
            .find_by_id(&friendship_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Friendship not found"))?;

        if !friendship.involves(&caller_id) {
            return Err(error::SystemError::forbidden("You are not a party to this friendship"));
        }

        if friendship.status != FriendshipStatus::Accepted {
            return Err(error::SystemError::bad_request("Users are not friends"));
        }

        if !self.friendship_repo.remove_if_accepted(&friendship_id).await? {
            return Err(error::SystemError::conflict("Friendship already removed"));
        }

        Ok(())
    }

    pub async fn list_friends(
        &self,
        user_id: Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<FriendsPage, error::SystemError> {
        let (friends, total) = tokio::try_join!(
            self.friendship_repo.list_accepted(&user_id, page, page_size),
            self.friendship_repo.count_accepted(&user_id),
        )?;

        Ok(FriendsPage { friends, page, pages: page_count(total, page_size), total })
    }

    pub async fn list_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FriendRequestResponse>, error::SystemError> {
        let rows = self.friendship_repo.list_pending(&user_id).await?;

        Ok(rows
            .into_iter()
            .map(|row| FriendRequestResponse {
                id: row.req_id,
                status: row.status,
                created_at: row.created_at,
                is_incoming: row.action_user != user_id,
                user: FriendInfo {
                    id: row.user_id,
                    username: row.username,
                    display_name: row.display_name,
                    avatar_url: row.avatar_url,
                },
            })
            .collect())
    }

    pub async fn friend_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, error::SystemError> {
        self.friendship_repo.friend_id_set(&user_id).await
    }

    /// True iff an accepted friendship exists between the two. A blocked or
    /// pending record refuses, as does no record at all.
    pub async fn is_authorized_to_message(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let friendship = self.friendship_repo.find_by_pair(user_id_a, user_id_b).await?;

        Ok(friendship.is_some_and(|f| f.status == FriendshipStatus::Accepted))
    }
}
