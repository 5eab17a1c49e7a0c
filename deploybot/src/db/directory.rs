//! [`DeployDirectory`] backed by the deployment database.

use std::collections::HashMap;

use sqlx::MySqlPool;

use crate::db::errors::DbError;
use crate::db::handlers::{Applies, Projects, Repository, ServerGroups, Servers, Users};
use crate::db::models::{
    applies::ApplyDBResponse,
    projects::ProjectDBResponse,
    servers::{ServerDBResponse, ServerGroupDBResponse},
    users::UserDBResponse,
};
use crate::errors::{Error, Result};
use crate::notify::context::DeployDirectory;
use crate::types::{ApplyId, GroupId, ProjectId, UserId};

/// Resolves entities with one pooled connection per lookup.
#[derive(Clone, Debug)]
pub struct SqlDirectory {
    pool: MySqlPool,
}

impl SqlDirectory {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn acquire(&self) -> Result<sqlx::pool::PoolConnection<sqlx::MySql>> {
        self.pool.acquire().await.map_err(|e| Error::Database(DbError::from(e)))
    }
}

#[async_trait::async_trait]
impl DeployDirectory for SqlDirectory {
    async fn get_apply(&self, id: ApplyId) -> Result<ApplyDBResponse> {
        let mut conn = self.acquire().await?;
        Applies::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Apply", id))
    }

    async fn get_project(&self, id: ProjectId) -> Result<ProjectDBResponse> {
        let mut conn = self.acquire().await?;
        Projects::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("Project", id))
    }

    async fn get_groups_by_ids(&self, ids: &[GroupId]) -> Result<HashMap<GroupId, ServerGroupDBResponse>> {
        let mut conn = self.acquire().await?;
        Ok(ServerGroups::new(&mut conn).get_bulk(ids.to_vec()).await?)
    }

    async fn get_servers_by_group_ids(&self, ids: &[GroupId]) -> Result<Vec<ServerDBResponse>> {
        let mut conn = self.acquire().await?;
        Ok(Servers::new(&mut conn).list_by_group_ids(ids).await?)
    }

    async fn get_user(&self, id: UserId) -> Result<UserDBResponse> {
        let mut conn = self.acquire().await?;
        Users::new(&mut conn)
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id))
    }
}
