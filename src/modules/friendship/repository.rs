use std::collections::HashSet;

use uuid::Uuid;

use crate::api::error;
use crate::modules::friendship::model::{FriendInfo, PendingRequestRow};
use crate::modules::friendship::schema::FriendshipEntity;

/// Relationship storage. One record per unordered pair, enforced by the
/// canonical-pair unique constraint, plus the per-user friend-set
/// projection mutated alongside the record.
#[async_trait::async_trait]
pub trait FriendshipRepository {
    /// Lookup independent of argument order.
    async fn find_by_pair(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    async fn find_by_id(
        &self,
        friendship_id: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError>;

    /// Inserts a pending record with `action_user = requester`. A concurrent
    /// insert for the same pair loses the unique constraint and surfaces as
    /// `Conflict`; callers never check-then-act.
    async fn insert_pending(
        &self,
        requester_id: &Uuid,
        target_id: &Uuid,
    ) -> Result<FriendshipEntity, error::SystemError>;

    /// Compare-and-swap pending -> accepted and add both friend links, in
    /// one transaction. False when the record was no longer pending.
    async fn accept_if_pending(
        &self,
        friendship_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<bool, error::SystemError>;

    /// Guarded delete for reject/cancel. False when no longer pending.
    async fn delete_if_pending(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError>;

    /// Deletes an accepted record and both friend links, in one
    /// transaction. False when the record was not accepted anymore.
    async fn remove_if_accepted(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError>;

    /// The user's friend set joined with profile data, most recently
    /// accepted first.
    async fn list_accepted(
        &self,
        user_id: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<FriendInfo>, error::SystemError>;

    async fn count_accepted(&self, user_id: &Uuid) -> Result<i64, error::SystemError>;

    /// Pending records on either side of `user_id`, newest first, joined
    /// with the other side's profile.
    async fn list_pending(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<PendingRequestRow>, error::SystemError>;

    async fn friend_id_set(&self, user_id: &Uuid) -> Result<HashSet<Uuid>, error::SystemError>;
}
