//! In-memory repository implementations backing the service-level tests.
//! They mirror the Postgres impls' semantics: canonical-pair uniqueness,
//! status-guarded transitions, idempotent friend links, and newest-first
//! message ordering with id tie-break.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use crate::api::error;
use crate::modules::friendship::model::{FriendInfo, PendingRequestRow};
use crate::modules::friendship::repository::FriendshipRepository;
use crate::modules::friendship::schema::{canonical_pair, FriendshipEntity, FriendshipStatus};
use crate::modules::message::model::InsertMessage;
use crate::modules::message::repository::MessageRepository;
use crate::modules::message::schema::MessageEntity;
use crate::modules::user::repository::UserRepository;
use crate::modules::user::schema::UserEntity;

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<HashMap<Uuid, UserEntity>>,
}

impl MemoryUserRepository {
    pub fn with_users(ids: &[Uuid]) -> Self {
        let users = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                (
                    *id,
                    UserEntity {
                        id: *id,
                        username: format!("user{i}"),
                        display_name: format!("User {i}"),
                        avatar_url: None,
                        created_at: Utc::now(),
                        updated_at: Utc::now(),
                    },
                )
            })
            .collect();
        Self { users: Mutex::new(users) }
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryFriendshipRepository {
    rows: Mutex<Vec<FriendshipEntity>>,
    // link -> insertion sequence, standing in for created_at ordering
    links: Mutex<HashMap<(Uuid, Uuid), u64>>,
    seq: AtomicU64,
}

impl MemoryFriendshipRepository {
    pub fn record_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn link_count(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub fn seed_blocked(&self, user_id_a: &Uuid, user_id_b: &Uuid) {
        let (user_low, user_high) = canonical_pair(user_id_a, user_id_b);
        self.rows.lock().unwrap().push(FriendshipEntity {
            id: Uuid::now_v7(),
            user_low,
            user_high,
            status: FriendshipStatus::Blocked,
            action_user: *user_id_a,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for MemoryFriendshipRepository {
    async fn find_by_pair(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_low, user_high) = canonical_pair(user_id_a, user_id_b);
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.user_low == user_low && r.user_high == user_high).cloned())
    }

    async fn find_by_id(
        &self,
        friendship_id: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.id == *friendship_id).cloned())
    }

    async fn insert_pending(
        &self,
        requester_id: &Uuid,
        target_id: &Uuid,
    ) -> Result<FriendshipEntity, error::SystemError> {
        let (user_low, user_high) = canonical_pair(requester_id, target_id);
        let mut rows = self.rows.lock().unwrap();

        if rows.iter().any(|r| r.user_low == user_low && r.user_high == user_high) {
            return Err(error::SystemError::conflict("Record already exists"));
        }

        let entity = FriendshipEntity {
            id: Uuid::now_v7(),
            user_low,
            user_high,
            status: FriendshipStatus::Pending,
            action_user: *requester_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(entity.clone());
        Ok(entity)
    }

    async fn accept_if_pending(
        &self,
        friendship_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();

        let row = match rows
            .iter_mut()
            .find(|r| r.id == *friendship_id && r.status == FriendshipStatus::Pending)
        {
            Some(row) => row,
            None => return Ok(false),
        };

        row.status = FriendshipStatus::Accepted;
        row.action_user = *responder_id;
        row.updated_at = Utc::now();
        let (user_low, user_high) = (row.user_low, row.user_high);

        let seq = self.seq.fetch_add(1, AtomicOrdering::SeqCst);
        let mut links = self.links.lock().unwrap();
        links.entry((user_low, user_high)).or_insert(seq);
        links.entry((user_high, user_low)).or_insert(seq);

        Ok(true)
    }

    async fn delete_if_pending(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let position = rows
            .iter()
            .position(|r| r.id == *friendship_id && r.status == FriendshipStatus::Pending);

        match position {
            Some(position) => {
                rows.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove_if_accepted(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let position = rows
            .iter()
            .position(|r| r.id == *friendship_id && r.status == FriendshipStatus::Accepted);

        let position = match position {
            Some(position) => position,
            None => return Ok(false),
        };

        let row = rows.remove(position);
        let mut links = self.links.lock().unwrap();
        links.remove(&(row.user_low, row.user_high));
        links.remove(&(row.user_high, row.user_low));

        Ok(true)
    }

    async fn list_accepted(
        &self,
        user_id: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<FriendInfo>, error::SystemError> {
        let links = self.links.lock().unwrap();
        let mut friends: Vec<(Uuid, u64)> = links
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|((_, friend), seq)| (*friend, *seq))
            .collect();
        friends.sort_by(|a, b| b.1.cmp(&a.1));

        let offset = ((page - 1) * page_size) as usize;
        Ok(friends
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .map(|(id, _)| FriendInfo {
                id,
                username: id.to_string(),
                display_name: id.to_string(),
                avatar_url: None,
            })
            .collect())
    }

    async fn count_accepted(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        let links = self.links.lock().unwrap();
        Ok(links.keys().filter(|(owner, _)| owner == user_id).count() as i64)
    }

    async fn list_pending(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<PendingRequestRow>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        let mut pending: Vec<&FriendshipEntity> = rows
            .iter()
            .filter(|r| r.status == FriendshipStatus::Pending && r.involves(user_id))
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(pending
            .into_iter()
            .map(|r| {
                let counterpart = r.counterpart_of(user_id);
                PendingRequestRow {
                    req_id: r.id,
                    status: r.status,
                    action_user: r.action_user,
                    created_at: r.created_at,
                    user_id: counterpart,
                    username: counterpart.to_string(),
                    display_name: counterpart.to_string(),
                    avatar_url: None,
                }
            })
            .collect())
    }

    async fn friend_id_set(&self, user_id: &Uuid) -> Result<HashSet<Uuid>, error::SystemError> {
        let links = self.links.lock().unwrap();
        Ok(links
            .keys()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, friend)| *friend)
            .collect())
    }
}

pub struct MemoryMessageRepository {
    rows: Mutex<Vec<MessageEntity>>,
    // strictly increasing insert timestamps keep ordering deterministic
    clock: AtomicI64,
}

impl Default for MemoryMessageRepository {
    fn default() -> Self {
        Self { rows: Mutex::new(Vec::new()), clock: AtomicI64::new(1_700_000_000) }
    }
}

impl MemoryMessageRepository {
    pub fn push(&self, message: MessageEntity) {
        self.rows.lock().unwrap().push(message);
    }

    fn between(message: &MessageEntity, user_id_a: &Uuid, user_id_b: &Uuid) -> bool {
        (message.sender_id == *user_id_a && message.recipient_id == *user_id_b)
            || (message.sender_id == *user_id_b && message.recipient_id == *user_id_a)
    }

    fn newest_first(messages: &mut [MessageEntity]) {
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemoryMessageRepository {
    async fn insert(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let at = self.clock.fetch_add(1, AtomicOrdering::SeqCst);
        let entity = MessageEntity {
            id: Uuid::now_v7(),
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            content: message.content.clone(),
            media_type: message.media_type,
            media_url: message.media_url.clone(),
            is_read: false,
            created_at: Utc.timestamp_opt(at, 0).unwrap(),
        };
        self.rows.lock().unwrap().push(entity.clone());
        Ok(entity)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|m| m.id == *message_id).cloned())
    }

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        let mut messages: Vec<MessageEntity> =
            rows.iter().filter(|m| Self::between(m, user_id_a, user_id_b)).cloned().collect();
        Self::newest_first(&mut messages);

        let offset = ((page - 1) * page_size) as usize;
        Ok(messages.into_iter().skip(offset).take(page_size as usize).collect())
    }

    async fn count_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|m| Self::between(m, user_id_a, user_id_b)).count() as i64)
    }

    async fn latest_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        let mut messages: Vec<MessageEntity> =
            rows.iter().filter(|m| Self::between(m, user_id_a, user_id_b)).cloned().collect();
        Self::newest_first(&mut messages);
        Ok(messages.into_iter().next())
    }

    async fn mark_read_bulk(
        &self,
        sender_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let mut flipped = 0;
        for message in rows
            .iter_mut()
            .filter(|m| m.sender_id == *sender_id && m.recipient_id == *recipient_id && !m.is_read)
        {
            message.is_read = true;
            flipped += 1;
        }
        Ok(flipped)
    }

    async fn count_unread_for_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|m| m.recipient_id == *recipient_id && !m.is_read).count() as i64)
    }

    async fn count_unread_from(
        &self,
        recipient_id: &Uuid,
        sender_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|m| {
                m.recipient_id == *recipient_id && m.sender_id == *sender_id && !m.is_read
            })
            .count() as i64)
    }

    async fn distinct_counterparts(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError> {
        let rows = self.rows.lock().unwrap();
        let counterparts: HashSet<Uuid> = rows
            .iter()
            .filter_map(|m| {
                if m.sender_id == *user_id {
                    Some(m.recipient_id)
                } else if m.recipient_id == *user_id {
                    Some(m.sender_id)
                } else {
                    None
                }
            })
            .collect();
        Ok(counterparts.into_iter().collect())
    }

    async fn delete_by_id(&self, message_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter().position(|m| m.id == *message_id) {
            Some(position) => {
                rows.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|m| !Self::between(m, user_id_a, user_id_b));
        Ok((before - rows.len()) as u64)
    }
}
