use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    api::error,
    modules::friendship::{
        model::{FriendInfo, PendingRequestRow},
        repository::FriendshipRepository,
        schema::{canonical_pair, FriendshipEntity},
    },
};

#[derive(Clone)]
pub struct FriendshipRepositoryPg {
    pool: sqlx::PgPool,
}

impl FriendshipRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FriendshipRepository for FriendshipRepositoryPg {
    async fn find_by_pair(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let (user_low, user_high) = canonical_pair(user_id_a, user_id_b);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            "SELECT * FROM friendships WHERE user_low = $1 AND user_high = $2",
        )
        .bind(user_low)
        .bind(user_high)
        .fetch_optional(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn find_by_id(
        &self,
        friendship_id: &Uuid,
    ) -> Result<Option<FriendshipEntity>, error::SystemError> {
        let friendship =
            sqlx::query_as::<_, FriendshipEntity>("SELECT * FROM friendships WHERE id = $1")
                .bind(friendship_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(friendship)
    }

    async fn insert_pending(
        &self,
        requester_id: &Uuid,
        target_id: &Uuid,
    ) -> Result<FriendshipEntity, error::SystemError> {
        let (user_low, user_high) = canonical_pair(requester_id, target_id);

        let friendship = sqlx::query_as::<_, FriendshipEntity>(
            r#"
            INSERT INTO friendships (id, user_low, user_high, status, action_user)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(user_low)
        .bind(user_high)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(friendship)
    }

    async fn accept_if_pending(
        &self,
        friendship_id: &Uuid,
        responder_id: &Uuid,
    ) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let pair = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            UPDATE friendships
            SET status = 'accepted', action_user = $2, updated_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING user_low, user_high
            "#,
        )
        .bind(friendship_id)
        .bind(responder_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_low, user_high) = match pair {
            Some(pair) => pair,
            None => return Ok(false),
        };

        sqlx::query(
            r#"
            INSERT INTO friend_links (user_id, friend_id)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_low)
        .bind(user_high)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn delete_if_pending(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM friendships WHERE id = $1 AND status = 'pending'")
            .bind(friendship_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_if_accepted(&self, friendship_id: &Uuid) -> Result<bool, error::SystemError> {
        let mut tx = self.pool.begin().await?;

        let pair = sqlx::query_as::<_, (Uuid, Uuid)>(
            "DELETE FROM friendships WHERE id = $1 AND status = 'accepted' RETURNING user_low, user_high",
        )
        .bind(friendship_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_low, user_high) = match pair {
            Some(pair) => pair,
            None => return Ok(false),
        };

        sqlx::query(
            r#"
            DELETE FROM friend_links
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_low)
        .bind(user_high)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(true)
    }

    async fn list_accepted(
        &self,
        user_id: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<FriendInfo>, error::SystemError> {
        let friends = sqlx::query_as::<_, FriendInfo>(
            r#"
            SELECT
                u.id,
                u.username,
                u.display_name,
                u.avatar_url
            FROM friend_links l
            JOIN users u ON u.id = l.friend_id
            WHERE l.user_id = $1
            ORDER BY l.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    async fn count_accepted(&self, user_id: &Uuid) -> Result<i64, error::SystemError> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM friend_links WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    async fn list_pending(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<PendingRequestRow>, error::SystemError> {
        let rows = sqlx::query_as::<_, PendingRequestRow>(
            r#"
            SELECT
                f.id AS req_id,
                f.status,
                f.action_user,
                f.created_at,
                u.id AS user_id,
                u.username,
                u.display_name,
                u.avatar_url
            FROM friendships f
            JOIN users u
                ON u.id = CASE
                    WHEN f.user_low = $1 THEN f.user_high
                    ELSE f.user_low
                END
            WHERE (f.user_low = $1 OR f.user_high = $1)
              AND f.status = 'pending'
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn friend_id_set(&self, user_id: &Uuid) -> Result<HashSet<Uuid>, error::SystemError> {
        let ids =
            sqlx::query_scalar::<_, Uuid>("SELECT friend_id FROM friend_links WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }
}
