//! Database repository for users.

use std::collections::HashMap;

use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::repository::{Repository, push_id_filter},
    models::users::UserDBResponse,
};
use crate::types::UserId;

const SELECT_USER: &str = "SELECT CAST(id AS SIGNED) AS id, username FROM syd_user";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct User {
    id: i64,
    username: String,
}

impl From<User> for UserDBResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

pub struct Users<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type Response = UserDBResponse;
    type Id = UserId;

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_USER);
        query.push(" WHERE id = ").push_bind(id);

        let user = query.build_query_as::<User>().fetch_optional(&mut *self.db).await?;

        Ok(user.map(UserDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_USER);
        push_id_filter(&mut query, "id", &ids);

        let users = query.build_query_as::<User>().fetch_all(&mut *self.db).await?;

        Ok(users.into_iter().map(|u| (u.id, UserDBResponse::from(u))).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::MySqlPool;

    #[sqlx::test(migrations = false, fixtures(path = "../fixtures", scripts("schema", "deploys")))]
    #[test_log::test]
    async fn test_get_by_id(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let user = repo.get_by_id(3).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(repo.get_by_id(99).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = false, fixtures(path = "../fixtures", scripts("schema", "deploys")))]
    #[test_log::test]
    async fn test_get_bulk(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Users::new(&mut conn);

        let users = repo.get_bulk(vec![3, 4, 99]).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[&4].username, "bob");
    }
}
