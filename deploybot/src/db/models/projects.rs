//! Database models for projects.

use crate::types::{GroupId, ProjectId};

/// Database response for a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDBResponse {
    pub id: ProjectId,
    pub name: String,
    /// Server groups the project is deployed to, in configured order
    pub online_cluster: Vec<GroupId>,
}
