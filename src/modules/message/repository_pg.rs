use uuid::Uuid;

use crate::{
    api::error,
    modules::message::{
        model::InsertMessage, repository::MessageRepository, schema::MessageEntity,
    },
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn insert(
        &self,
        message: &InsertMessage,
    ) -> Result<MessageEntity, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, content, media_type, media_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.content)
        .bind(message.media_type)
        .bind(&message.media_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn find_by_id(
        &self,
        message_id: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>("SELECT * FROM messages WHERE id = $1")
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(message)
    }

    async fn find_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // has index on (sender_id, recipient_id, created_at DESC)
        let messages = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .bind(page_size)
        .bind((page - 1) * page_size)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn count_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn latest_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<Option<MessageEntity>, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(message)
    }

    async fn mark_read_bulk(
        &self,
        sender_id: &Uuid,
        recipient_id: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = TRUE
            WHERE sender_id = $1 AND recipient_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread_for_recipient(
        &self,
        recipient_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn count_unread_from(
        &self,
        recipient_id: &Uuid,
        sender_id: &Uuid,
    ) -> Result<i64, error::SystemError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE recipient_id = $1 AND sender_id = $2 AND is_read = FALSE
            "#,
        )
        .bind(recipient_id)
        .bind(sender_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn distinct_counterparts(
        &self,
        user_id: &Uuid,
    ) -> Result<Vec<Uuid>, error::SystemError> {
        let counterparts = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT DISTINCT CASE
                WHEN sender_id = $1 THEN recipient_id
                ELSE sender_id
            END
            FROM messages
            WHERE sender_id = $1 OR recipient_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(counterparts)
    }

    async fn delete_by_id(&self, message_id: &Uuid) -> Result<bool, error::SystemError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(message_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_between(
        &self,
        user_id_a: &Uuid,
        user_id_b: &Uuid,
    ) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            "#,
        )
        .bind(user_id_a)
        .bind(user_id_b)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
