//! User model.

use ptp_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
