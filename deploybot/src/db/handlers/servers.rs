//! Database repository for servers.

use std::collections::HashMap;

use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::repository::{Repository, push_id_filter},
    models::servers::ServerDBResponse,
};
use crate::types::{GroupId, ServerId};

const SELECT_SERVER: &str = "SELECT CAST(id AS SIGNED) AS id, CAST(group_id AS SIGNED) AS group_id FROM syd_server";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Server {
    id: i64,
    group_id: i64,
}

impl From<Server> for ServerDBResponse {
    fn from(server: Server) -> Self {
        Self {
            id: server.id,
            group_id: server.group_id,
        }
    }
}

pub struct Servers<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> Servers<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }

    /// List every server belonging to any of the given groups.
    #[instrument(skip(self, group_ids), fields(groups = group_ids.len()), err)]
    pub async fn list_by_group_ids(&mut self, group_ids: &[GroupId]) -> Result<Vec<ServerDBResponse>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_SERVER);
        push_id_filter(&mut query, "group_id", group_ids);
        query.push(" ORDER BY id");

        let servers = query.build_query_as::<Server>().fetch_all(&mut *self.db).await?;

        Ok(servers.into_iter().map(ServerDBResponse::from).collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Servers<'c> {
    type Response = ServerDBResponse;
    type Id = ServerId;

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_SERVER);
        query.push(" WHERE id = ").push_bind(id);

        let server = query.build_query_as::<Server>().fetch_optional(&mut *self.db).await?;

        Ok(server.map(ServerDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_SERVER);
        push_id_filter(&mut query, "id", &ids);

        let servers = query.build_query_as::<Server>().fetch_all(&mut *self.db).await?;

        Ok(servers.into_iter().map(|s| (s.id, ServerDBResponse::from(s))).collect())
    }
}
