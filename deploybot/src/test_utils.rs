//! In-memory fakes for the notification collaborators.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::commit::CommitMessages;
use crate::db::models::{
    applies::ApplyDBResponse,
    projects::ProjectDBResponse,
    servers::{ServerDBResponse, ServerGroupDBResponse},
    users::UserDBResponse,
};
use crate::errors::{Error, Result};
use crate::notify::context::DeployDirectory;
use crate::types::{ApplyId, GroupId, ProjectId, UserId};

/// Map-backed directory that records which lookups ran.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    pub applies: HashMap<ApplyId, ApplyDBResponse>,
    pub projects: HashMap<ProjectId, ProjectDBResponse>,
    pub groups: HashMap<GroupId, ServerGroupDBResponse>,
    pub servers: Vec<ServerDBResponse>,
    pub users: HashMap<UserId, UserDBResponse>,
    calls: Mutex<Vec<&'static str>>,
}

impl InMemoryDirectory {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl DeployDirectory for InMemoryDirectory {
    async fn get_apply(&self, id: ApplyId) -> Result<ApplyDBResponse> {
        self.record("apply");
        self.applies.get(&id).cloned().ok_or_else(|| Error::not_found("Apply", id))
    }

    async fn get_project(&self, id: ProjectId) -> Result<ProjectDBResponse> {
        self.record("project");
        self.projects.get(&id).cloned().ok_or_else(|| Error::not_found("Project", id))
    }

    async fn get_groups_by_ids(&self, ids: &[GroupId]) -> Result<HashMap<GroupId, ServerGroupDBResponse>> {
        self.record("groups");
        Ok(ids
            .iter()
            .filter_map(|id| self.groups.get(id).map(|g| (*id, g.clone())))
            .collect())
    }

    async fn get_servers_by_group_ids(&self, ids: &[GroupId]) -> Result<Vec<ServerDBResponse>> {
        self.record("servers");
        Ok(self.servers.iter().filter(|s| ids.contains(&s.group_id)).cloned().collect())
    }

    async fn get_user(&self, id: UserId) -> Result<UserDBResponse> {
        self.record("user");
        self.users.get(&id).cloned().ok_or_else(|| Error::not_found("User", id))
    }
}

/// Apply 42 of project "checkout" (clusters prod and staging, three servers) by alice.
pub fn checkout_directory() -> InMemoryDirectory {
    let mut directory = InMemoryDirectory::default();

    directory.applies.insert(
        42,
        ApplyDBResponse {
            id: 42,
            project_id: 7,
            user_id: 3,
            branch_name: "main".to_string(),
            commit_version: String::new(),
        },
    );
    directory.projects.insert(
        7,
        ProjectDBResponse {
            id: 7,
            name: "checkout".to_string(),
            online_cluster: vec![1, 2],
        },
    );
    for (id, name) in [(1, "prod"), (2, "staging"), (5, "sandbox")] {
        directory.groups.insert(id, ServerGroupDBResponse { id, name: name.to_string() });
    }
    // Server 13 sits in a group the project does not deploy to
    for (id, group_id) in [(10, 1), (11, 1), (12, 2), (13, 5)] {
        directory.servers.push(ServerDBResponse { id, group_id });
    }
    directory.users.insert(
        3,
        UserDBResponse {
            id: 3,
            username: "alice".to_string(),
        },
    );

    directory
}

pub struct FixedCommitMessages {
    message: String,
}

impl FixedCommitMessages {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait::async_trait]
impl CommitMessages for FixedCommitMessages {
    async fn latest_commit_message(&self) -> Result<String> {
        Ok(self.message.clone())
    }
}

pub struct FailingCommitMessages;

#[async_trait::async_trait]
impl CommitMessages for FailingCommitMessages {
    async fn latest_commit_message(&self) -> Result<String> {
        Err(Error::CommitMessage {
            message: "not a git repository".to_string(),
        })
    }
}
