//! Repository for the `users` table.

use sqlx::PgPool;

use ptp_core::types::DbId;

use crate::models::user::User;

/// Column list for `users` queries.
const COLUMNS: &str = "id, email, created_at, updated_at";

/// Provides user lookups.
pub struct UserRepo;

impl UserRepo {
    /// Find a user by their ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
