//! Database repository for deployment requests (applies).

use std::collections::HashMap;

use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};
use tracing::instrument;

use crate::db::{
    errors::Result,
    handlers::repository::{Repository, push_id_filter},
    models::applies::ApplyDBResponse,
};
use crate::types::ApplyId;

const SELECT_APPLY: &str = "SELECT CAST(id AS SIGNED) AS id, CAST(project_id AS SIGNED) AS project_id, \
     CAST(user_id AS SIGNED) AS user_id, branch_name, commit_version FROM syd_deploy_apply";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Apply {
    id: i64,
    project_id: i64,
    user_id: i64,
    branch_name: String,
    commit_version: Option<String>,
}

impl From<Apply> for ApplyDBResponse {
    fn from(apply: Apply) -> Self {
        Self {
            id: apply.id,
            project_id: apply.project_id,
            user_id: apply.user_id,
            branch_name: apply.branch_name,
            commit_version: apply.commit_version.unwrap_or_default(),
        }
    }
}

pub struct Applies<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> Applies<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Applies<'c> {
    type Response = ApplyDBResponse;
    type Id = ApplyId;

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_APPLY);
        query.push(" WHERE id = ").push_bind(id);

        let apply = query.build_query_as::<Apply>().fetch_optional(&mut *self.db).await?;

        Ok(apply.map(ApplyDBResponse::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_APPLY);
        push_id_filter(&mut query, "id", &ids);

        let applies = query.build_query_as::<Apply>().fetch_all(&mut *self.db).await?;

        Ok(applies.into_iter().map(|a| (a.id, ApplyDBResponse::from(a))).collect())
    }
}
