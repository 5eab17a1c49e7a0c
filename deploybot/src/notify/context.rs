//! Resolve a deployment event into everything the message needs.
//!
//! Lookups run in a fixed order and stop at the first failure, so a context either exists
//! fully populated or not at all:
//!
//! ```text
//! event.apply_id ──► apply ──► project ──► groups (by project.online_cluster)
//!                      │                └─► servers (same group ids, counted)
//!                      └─► user (apply.user_id)
//! commit message collaborator ──► latest commit message
//! ```

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::commit::CommitMessages;
use crate::db::models::{
    applies::ApplyDBResponse,
    projects::ProjectDBResponse,
    servers::{ServerDBResponse, ServerGroupDBResponse},
    users::UserDBResponse,
};
use crate::errors::Result;
use crate::notify::events::DeploymentEvent;
use crate::types::{ApplyId, GroupId, ProjectId, UserId};

/// Read-only access to the entities a notification refers to.
#[async_trait::async_trait]
pub trait DeployDirectory: Send + Sync {
    async fn get_apply(&self, id: ApplyId) -> Result<ApplyDBResponse>;

    async fn get_project(&self, id: ProjectId) -> Result<ProjectDBResponse>;

    /// Groups keyed by id. Ids without a group are absent from the map.
    async fn get_groups_by_ids(&self, ids: &[GroupId]) -> Result<HashMap<GroupId, ServerGroupDBResponse>>;

    async fn get_servers_by_group_ids(&self, ids: &[GroupId]) -> Result<Vec<ServerDBResponse>>;

    async fn get_user(&self, id: UserId) -> Result<UserDBResponse>;
}

/// A fully resolved deployment event. Built once per delivery and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContext {
    pub event: DeploymentEvent,
    pub apply: ApplyDBResponse,
    pub project: ProjectDBResponse,
    pub server_count: usize,
    /// Group names joined with `,` in the project's cluster order
    pub group_names: String,
    pub commit_message: String,
    pub username: String,
}

#[instrument(skip_all, fields(apply_id = event.apply_id), err)]
pub async fn resolve(event: DeploymentEvent, directory: &dyn DeployDirectory, commits: &dyn CommitMessages) -> Result<NotificationContext> {
    let apply = directory.get_apply(event.apply_id).await?;
    let project = directory.get_project(apply.project_id).await?;

    let groups = directory.get_groups_by_ids(&project.online_cluster).await?;
    let group_names = join_group_names(&project.online_cluster, &groups);

    let servers = directory.get_servers_by_group_ids(&project.online_cluster).await?;

    let user = directory.get_user(apply.user_id).await?;
    let commit_message = commits.latest_commit_message().await?;

    debug!(
        project = %project.name,
        servers = servers.len(),
        groups = %group_names,
        "Resolved notification context"
    );

    Ok(NotificationContext {
        event,
        apply,
        server_count: servers.len(),
        project,
        group_names,
        commit_message,
        username: user.username,
    })
}

fn join_group_names(order: &[GroupId], groups: &HashMap<GroupId, ServerGroupDBResponse>) -> String {
    order
        .iter()
        .filter_map(|id| {
            let group = groups.get(id);
            if group.is_none() {
                debug!(group_id = id, "Online cluster references a missing server group, skipping");
            }
            group.map(|g| g.name.as_str())
        })
        .collect::<Vec<_>>()
        .join(",")
}
