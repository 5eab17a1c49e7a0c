//! # deploybot: deployment outcome notifications
//!
//! When a deployment finishes, deploybot announces it in a team chat through a signed
//! webhook. Each event is resolved against the deployment database (apply, project, server
//! groups, servers, publisher), combined with the latest commit message, rendered as a
//! seven-line rich-text post and sent with an HMAC-SHA256 signature.
//!
//! Notifications are best-effort: they run on a bounded background pool, a failed lookup
//! means nothing is sent, and transport failures are logged and dropped.
//!
//! ## Architecture
//!
//! - [`notify`]: events, context resolution, message rendering, signing and dispatch
//! - [`db`]: MySQL pool and read-only repositories behind [`notify::DeployDirectory`]
//! - [`commit`]: latest commit message via `git log`
//! - [`config`]: YAML + environment configuration
//! - [`telemetry`]: tracing setup with optional OpenTelemetry export
//!
//! ## Usage
//!
//! ```no_run
//! use deploybot::{Application, Config};
//! use deploybot::notify::{DeployMode, DeployStatus, DeploymentEvent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = deploybot::config::Args { config: "config.yaml".into(), validate: false, command: None };
//!     let app = Application::new(Config::load(&args)?).await?;
//!
//!     app.notify(DeploymentEvent::new(42, DeployMode::Branch, DeployStatus::Success, "release"));
//!
//!     // Waits for queued notifications before closing the pool
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod commit;
pub mod config;
pub mod db;
pub mod errors;
pub mod notify;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use sqlx::MySqlPool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

pub use config::Config;

use crate::commit::GitCommitMessages;
use crate::db::SqlDirectory;
use crate::notify::{DeployNotifier, DeploymentEvent, NotificationPipeline};

/// Database pool plus the background notifier, wired from one [`Config`].
pub struct Application {
    pool: MySqlPool,
    notifier: Option<DeployNotifier>,
    shutdown_token: CancellationToken,
}

impl Application {
    /// Connect to the database and start the notifier.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = db::pools::connect(&config.database).await?;
        Self::with_pool(config, pool)
    }

    /// Start the notifier on an existing pool.
    pub fn with_pool(config: Config, pool: MySqlPool) -> anyhow::Result<Self> {
        let shutdown_token = CancellationToken::new();

        let notifier = if config.notifications.enabled {
            let pipeline = NotificationPipeline::new(
                Arc::new(SqlDirectory::new(pool.clone())),
                Arc::new(GitCommitMessages::new(config.git.repo_dir.clone())),
                config.app_host.clone(),
                &config.notifications.feishu,
            )?;
            info!(
                max_in_flight = config.notifications.max_in_flight,
                queue_capacity = config.notifications.queue_capacity,
                "Deployment notifications enabled"
            );
            Some(DeployNotifier::spawn(pipeline, &config.notifications, shutdown_token.clone()))
        } else {
            info!("Deployment notifications disabled");
            None
        };

        Ok(Self {
            pool,
            notifier,
            shutdown_token,
        })
    }

    /// Queue a notification for `event`. Never blocks and never fails the caller.
    ///
    /// Returns `false` if the event was not queued (notifications disabled, queue full, or
    /// shutting down).
    pub fn notify(&self, event: DeploymentEvent) -> bool {
        match &self.notifier {
            Some(notifier) => notifier.notify(event),
            None => {
                debug!(apply_id = event.apply_id, "Notifications disabled, ignoring event");
                false
            }
        }
    }

    /// Stop intake immediately. Deliveries already running are still awaited by [`Self::shutdown`].
    pub fn cancel(&self) {
        self.shutdown_token.cancel();
    }

    /// Drain the notifier and close the pool.
    pub async fn shutdown(self) {
        if let Some(notifier) = self.notifier {
            notifier.close().await;
        }
        self.pool.close().await;
        info!("Shutdown complete");
    }
}
