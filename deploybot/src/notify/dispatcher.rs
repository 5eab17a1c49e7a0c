//! Deployment notification dispatch: queue, resolve, sign, send.
//!
//! ```text
//! DeployNotifier::notify(event)          // never blocks
//!   └─ queue_tx.try_send(event) ──────────────────────────────┐
//!        (full → drop + warn)                                 │
//!                                                             ▼
//! run_worker (spawned task):
//!   ├─ recv from queue
//!   ├─ acquire semaphore permit (caps in-flight deliveries)
//!   └─ spawn NotificationPipeline::deliver(event)
//!        ├─ resolve()          // entity lookups; any failure → abort, nothing sent
//!        ├─ render()           // seven-line rich-text post
//!        ├─ sign()             // HMAC-SHA256 over the current timestamp
//!        └─ HTTP POST          // one attempt; failures are logged and dropped
//! ```
//!
//! Failures never reach the caller of `notify` and never take the process down. Each
//! delivery runs in its own task, so a panic is contained there as well.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use reqwest::header::CONTENT_TYPE;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::commit::CommitMessages;
use crate::config::{FeishuConfig, NotificationsConfig};
use crate::errors::{Error, FailureKind, Result};
use crate::notify::context::{self, DeployDirectory};
use crate::notify::events::DeploymentEvent;
use crate::notify::message::{self, FeishuMessage};

// --- Pipeline ---

/// Everything one delivery needs. Shared read-only by all delivery tasks.
pub struct NotificationPipeline {
    directory: Arc<dyn DeployDirectory>,
    commits: Arc<dyn CommitMessages>,
    http_client: reqwest::Client,
    webhook_url: String,
    secret: String,
    app_host: String,
}

impl NotificationPipeline {
    pub fn new(
        directory: Arc<dyn DeployDirectory>,
        commits: Arc<dyn CommitMessages>,
        app_host: impl Into<String>,
        feishu: &FeishuConfig,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = feishu.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Other(anyhow::Error::from(e).context("Failed to create webhook HTTP client")))?;

        Ok(Self {
            directory,
            commits,
            http_client,
            webhook_url: feishu.url.clone(),
            secret: feishu.secret.clone(),
            app_host: app_host.into(),
        })
    }

    /// Resolve, sign and send one notification. Returns the webhook's HTTP status.
    pub async fn deliver(&self, event: &DeploymentEvent) -> Result<u16> {
        self.deliver_at(event, Utc::now().timestamp()).await
    }

    /// [`Self::deliver`] with an explicit signing timestamp (unix seconds).
    #[instrument(skip(self, event), fields(apply_id = event.apply_id, status = %event.status), err)]
    pub async fn deliver_at(&self, event: &DeploymentEvent, timestamp: i64) -> Result<u16> {
        let ctx = context::resolve(event.clone(), self.directory.as_ref(), self.commits.as_ref()).await?;

        let body = message::render(&ctx, &self.app_host);
        let message = FeishuMessage::signed_post(body, timestamp, &self.secret)?;
        let payload = serde_json::to_string(&message).map_err(|e| Error::Other(anyhow::Error::from(e).context("Failed to serialize webhook payload")))?;

        debug!(url = %self.webhook_url, "Sending deployment notification");

        let response = self
            .http_client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::Delivery {
                status_code: None,
                message: e.to_string(),
            })?;

        let status_code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(Error::Delivery {
                status_code: Some(status_code),
                message: format!("HTTP {}", status_code),
            });
        }

        Ok(status_code)
    }
}

// --- Notifier ---

/// Handle used by the deployment workflow to announce finished deployments.
pub struct DeployNotifier {
    queue_tx: mpsc::Sender<DeploymentEvent>,
    worker: JoinHandle<()>,
}

impl DeployNotifier {
    /// Spawn the worker. `shutdown` stops intake immediately; [`Self::close`] drains instead.
    pub fn spawn(pipeline: NotificationPipeline, config: &NotificationsConfig, shutdown: CancellationToken) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);

        let worker = tokio::spawn(run_worker(
            queue_rx,
            Arc::new(pipeline),
            config.max_in_flight,
            config.drain_timeout,
            shutdown,
        ));

        Self { queue_tx, worker }
    }

    /// Queue a notification. Returns `false` if it was dropped.
    pub fn notify(&self, event: DeploymentEvent) -> bool {
        match self.queue_tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                counter!("deploybot_notifications_dropped_total", "reason" => "queue_full").increment(1);
                warn!(apply_id = event.apply_id, status = %event.status, "Notification queue full, dropping event");
                false
            }
            Err(TrySendError::Closed(event)) => {
                counter!("deploybot_notifications_dropped_total", "reason" => "closed").increment(1);
                warn!(apply_id = event.apply_id, status = %event.status, "Notification worker stopped, dropping event");
                false
            }
        }
    }

    /// Stop accepting events, deliver what is queued and wait for in-flight deliveries.
    pub async fn close(self) {
        drop(self.queue_tx);
        if let Err(e) = self.worker.await {
            warn!(error = %e, "Notification worker exited abnormally");
        }
    }
}

// --- Worker task ---

async fn run_worker(
    mut rx: mpsc::Receiver<DeploymentEvent>,
    pipeline: Arc<NotificationPipeline>,
    max_in_flight: usize,
    drain_timeout: Duration,
    shutdown: CancellationToken,
) {
    let semaphore = Arc::new(Semaphore::new(max_in_flight));

    loop {
        let event = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!("Notification worker received shutdown signal");
                break;
            }
            event = rx.recv() => {
                match event {
                    Some(e) => e,
                    None => {
                        debug!("Notification queue closed, shutting down");
                        break;
                    }
                }
            }
        };

        let permit = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                counter!("deploybot_notifications_dropped_total", "reason" => "shutdown").increment(1);
                warn!(apply_id = event.apply_id, status = %event.status, "Dropping notification waiting for a delivery slot on shutdown");
                break;
            }
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => {
                    warn!("Notification semaphore closed");
                    break;
                }
            },
        };

        let pipeline = pipeline.clone();
        tokio::spawn(async move {
            let _permit = permit;
            deliver_and_log(&pipeline, event).await;
        });
    }

    rx.close();
    let mut abandoned = 0u64;
    while rx.try_recv().is_ok() {
        abandoned += 1;
    }
    if abandoned > 0 {
        counter!("deploybot_notifications_dropped_total", "reason" => "shutdown").increment(abandoned);
        warn!(count = abandoned, "Dropping queued notifications on shutdown");
    }

    // Delivery tasks hold a permit until they finish
    match tokio::time::timeout(drain_timeout, semaphore.acquire_many(max_in_flight as u32)).await {
        Ok(_) => debug!("All in-flight notifications finished"),
        Err(_) => warn!(?drain_timeout, "Timed out waiting for in-flight notifications"),
    }

    debug!("Notification worker exited");
}

async fn deliver_and_log(pipeline: &NotificationPipeline, event: DeploymentEvent) {
    match pipeline.deliver(&event).await {
        Ok(status_code) => {
            counter!("deploybot_notifications_total", "outcome" => "delivered").increment(1);
            info!(
                apply_id = event.apply_id,
                status = %event.status,
                status_code,
                "Deployment notification delivered"
            );
        }
        Err(e) => {
            let kind = e.kind();
            counter!("deploybot_notifications_total", "outcome" => kind.as_str()).increment(1);
            match kind {
                FailureKind::Resolution => info!(
                    apply_id = event.apply_id,
                    error = %e,
                    "Skipping deployment notification, event could not be resolved"
                ),
                FailureKind::Transport => {
                    let status_code = match &e {
                        Error::Delivery { status_code, .. } => *status_code,
                        _ => None,
                    };
                    warn!(
                        apply_id = event.apply_id,
                        status_code = ?status_code,
                        error = %e,
                        "Deployment notification delivery failed"
                    );
                }
                FailureKind::Signing | FailureKind::Internal => warn!(
                    apply_id = event.apply_id,
                    kind = kind.as_str(),
                    error = %e,
                    "Deployment notification failed"
                ),
            }
        }
    }
}
