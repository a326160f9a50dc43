use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "friendship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Blocked,
}

/// One record per unordered user pair. `action_user` is whoever produced the
/// current status: the requester while pending, the accepter once accepted.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FriendshipEntity {
    pub id: Uuid,
    pub user_low: Uuid,
    pub user_high: Uuid,
    pub status: FriendshipStatus,
    pub action_user: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl FriendshipEntity {
    pub fn involves(&self, user_id: &Uuid) -> bool {
        self.user_low == *user_id || self.user_high == *user_id
    }

    /// The other side of the record. Only meaningful when `involves` holds.
    pub fn counterpart_of(&self, user_id: &Uuid) -> Uuid {
        if self.user_low == *user_id {
            self.user_high
        } else {
            self.user_low
        }
    }
}

/// Order-independent encoding of a pair: smallest identifier first. The
/// storage key that makes the one-record-per-pair constraint enforceable.
pub fn canonical_pair(a: &Uuid, b: &Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (*a, *b)
    } else {
        (*b, *a)
    }
}
