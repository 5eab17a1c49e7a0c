//! Database models for deployment requests (applies).

use crate::types::{ApplyId, ProjectId, UserId};

/// Database response for an apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyDBResponse {
    pub id: ApplyId,
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub branch_name: String,
    /// Empty when the apply deploys the head of `branch_name`
    pub commit_version: String,
}

impl ApplyDBResponse {
    /// The revision shown to humans: the commit when pinned, otherwise the branch.
    pub fn version(&self) -> &str {
        if self.commit_version.is_empty() {
            &self.branch_name
        } else {
            &self.commit_version
        }
    }
}
