//! Database models for users.

use crate::types::UserId;

/// Database response for a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
}
