use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{api::error, ENV};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub async fn connect_database() -> Result<PgPool, error::SystemError> {
    let database_url = &ENV.database_url;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_slow_threshold(std::time::Duration::from_secs(3))
        .connect(database_url)
        .await?;

    MIGRATOR.run(&pool).await.map_err(|e| {
        log::error!("Migration failed: {:?}", e);
        error::SystemError::DatabaseError(e.to_string().into())
    })?;

    Ok(pool)
}
