//! Database access layer: sqlx models and repositories.

pub mod models;
pub mod repositories;

use sqlx::PgPool;

/// Verify the database connection is alive.
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
