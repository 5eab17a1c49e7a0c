//! Latest commit message lookup.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, instrument};

use crate::errors::{Error, Result};

#[async_trait::async_trait]
pub trait CommitMessages: Send + Sync {
    async fn latest_commit_message(&self) -> Result<String>;
}

/// Reads the message of `HEAD` with `git log`.
#[derive(Debug, Clone, Default)]
pub struct GitCommitMessages {
    repo_dir: Option<PathBuf>,
}

impl GitCommitMessages {
    /// `repo_dir` of `None` runs git in the process working directory.
    pub fn new(repo_dir: Option<PathBuf>) -> Self {
        Self { repo_dir }
    }
}

#[async_trait::async_trait]
impl CommitMessages for GitCommitMessages {
    #[instrument(skip(self), fields(repo_dir = ?self.repo_dir), err)]
    async fn latest_commit_message(&self) -> Result<String> {
        let mut command = Command::new("git");
        command.args(["log", "-1", "--pretty=%B"]);
        if let Some(dir) = &self.repo_dir {
            command.current_dir(dir);
        }

        let output = command.output().await.map_err(|e| Error::CommitMessage {
            message: format!("failed to run git: {e}"),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::CommitMessage {
                message: format!("git log exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let message = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!(len = message.len(), "Read latest commit message");
        Ok(message)
    }
}
