//! Database repository for server groups.

use std::collections::HashMap;

use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::repository::{Repository, push_id_filter},
    models::servers::ServerGroupDBResponse,
};
use crate::types::GroupId;

const SELECT_GROUP: &str = "SELECT CAST(id AS SIGNED) AS id, name FROM syd_server_group";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct ServerGroup {
    id: i64,
    name: String,
}

impl From<ServerGroup> for ServerGroupDBResponse {
    fn from(group: ServerGroup) -> Self {
        Self {
            id: group.id,
            name: group.name,
        }
    }
}

pub struct ServerGroups<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> ServerGroups<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for ServerGroups<'c> {
    type Response = ServerGroupDBResponse;
    type Id = GroupId;

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_GROUP);
        query.push(" WHERE id = ").push_bind(id);

        let group = query.build_query_as::<ServerGroup>().fetch_optional(&mut *self.db).await?;

        Ok(group.map(ServerGroupDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_GROUP);
        push_id_filter(&mut query, "id", &ids);

        let groups = query.build_query_as::<ServerGroup>().fetch_all(&mut *self.db).await?;

        Ok(groups.into_iter().map(|g| (g.id, ServerGroupDBResponse::from(g))).collect())
    }
}
