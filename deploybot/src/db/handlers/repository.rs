//! Base repository trait for read-only database access.

use std::collections::HashMap;

use sqlx::{MySql, QueryBuilder};

use crate::db::errors::Result;

/// Read-only repository over one table.
///
/// Each repository wraps a MySQL connection and returns immutable value objects from
/// [`crate::db::models`]. Nothing here writes; the deployment workflow owns those tables.
#[async_trait::async_trait]
pub trait Repository {
    /// The response/DTO type returned by operations
    type Response;

    /// The identifier type for lookups
    type Id: Send + Sync;

    /// Get an entity by ID
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>>;

    /// Get lots of entities by their IDs, keyed by ID
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>>;
}

/// Append `WHERE {column} IN (?, ?, ...)` binding every id. `ids` must not be empty.
pub(crate) fn push_id_filter(query: &mut QueryBuilder<'_, MySql>, column: &str, ids: &[i64]) {
    query.push(" WHERE ").push(column).push(" IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}
