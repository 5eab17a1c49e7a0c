//! Database repository for projects.

use std::collections::HashMap;

use sqlx::{FromRow, MySql, MySqlConnection, QueryBuilder};
use tracing::instrument;

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::{Repository, push_id_filter},
    models::projects::ProjectDBResponse,
};
use crate::types::{ProjectId, parse_id_list};

const SELECT_PROJECT: &str = "SELECT CAST(id AS SIGNED) AS id, name, online_cluster FROM syd_project";

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Project {
    id: i64,
    name: String,
    /// Comma separated server group ids
    online_cluster: Option<String>,
}

impl TryFrom<Project> for ProjectDBResponse {
    type Error = DbError;

    fn try_from(project: Project) -> Result<Self> {
        let online_cluster = parse_id_list(project.online_cluster.as_deref().unwrap_or_default()).map_err(|e| DbError::Malformed {
            column: "syd_project.online_cluster",
            message: e.to_string(),
        })?;

        Ok(Self {
            id: project.id,
            name: project.name,
            online_cluster,
        })
    }
}

pub struct Projects<'c> {
    db: &'c mut MySqlConnection,
}

impl<'c> Projects<'c> {
    pub fn new(db: &'c mut MySqlConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Projects<'c> {
    type Response = ProjectDBResponse;
    type Id = ProjectId;

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let mut query = QueryBuilder::<MySql>::new(SELECT_PROJECT);
        query.push(" WHERE id = ").push_bind(id);

        let project = query.build_query_as::<Project>().fetch_optional(&mut *self.db).await?;

        project.map(ProjectDBResponse::try_from).transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut query = QueryBuilder::<MySql>::new(SELECT_PROJECT);
        push_id_filter(&mut query, "id", &ids);

        let projects = query.build_query_as::<Project>().fetch_all(&mut *self.db).await?;

        projects
            .into_iter()
            .map(|p| ProjectDBResponse::try_from(p).map(|p| (p.id, p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::MySqlPool;

    fn row(online_cluster: Option<&str>) -> Project {
        Project {
            id: 9,
            name: "checkout".to_string(),
            online_cluster: online_cluster.map(str::to_string),
        }
    }

    #[test]
    fn test_online_cluster_parsed_in_order() {
        let project = ProjectDBResponse::try_from(row(Some("5,2,7"))).unwrap();
        assert_eq!(project.online_cluster, vec![5, 2, 7]);
        assert_eq!(project.name, "checkout");
    }

    #[test]
    fn test_missing_online_cluster_is_empty() {
        let project = ProjectDBResponse::try_from(row(None)).unwrap();
        assert!(project.online_cluster.is_empty());
    }

    #[test]
    fn test_malformed_online_cluster() {
        let err = ProjectDBResponse::try_from(row(Some("1,prod"))).unwrap_err();
        assert!(matches!(err, DbError::Malformed { .. }));
    }

    #[sqlx::test(migrations = false, fixtures(path = "../fixtures", scripts("schema", "deploys")))]
    #[test_log::test]
    async fn test_get_by_id_reads_online_cluster(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Projects::new(&mut conn);

        let project = repo.get_by_id(7).await.unwrap().unwrap();
        assert_eq!(project.name, "checkout");
        assert_eq!(project.online_cluster, vec![1, 2]);

        let billing = repo.get_by_id(8).await.unwrap().unwrap();
        assert!(billing.online_cluster.is_empty());

        assert!(repo.get_by_id(404).await.unwrap().is_none());
    }

    #[sqlx::test(migrations = false, fixtures(path = "../fixtures", scripts("schema", "deploys")))]
    #[test_log::test]
    async fn test_get_by_id_malformed_online_cluster(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let err = Projects::new(&mut conn).get_by_id(9).await.unwrap_err();
        assert!(matches!(err, DbError::Malformed { column: "syd_project.online_cluster", .. }));
    }

    #[sqlx::test(migrations = false, fixtures(path = "../fixtures", scripts("schema", "deploys")))]
    #[test_log::test]
    async fn test_get_bulk(pool: MySqlPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Projects::new(&mut conn);

        let projects = repo.get_bulk(vec![7, 8, 404]).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[&7].online_cluster, vec![1, 2]);
        assert_eq!(projects[&8].name, "billing");

        // One malformed row fails the whole batch
        assert!(repo.get_bulk(vec![7, 9]).await.is_err());
    }
}
