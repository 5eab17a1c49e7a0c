//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `DEPLOYBOT_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `DEPLOYBOT_` override YAML values
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `DEPLOYBOT_NOTIFICATIONS__FEISHU__SECRET=...` sets `notifications.feishu.secret`.
//!
//! ## Configuration Structure
//!
//! - **app_host**: public base URL of the deployment UI, used to build deploy links
//! - **database**: MySQL connection and pool settings
//! - **notifications**: webhook target, signing secret and worker pool limits
//! - **git**: where the latest commit message is read from
//!
//! ```yaml
//! app_host: https://deploy.example.com
//! database:
//!   host: 127.0.0.1
//!   port: 3306
//!   user: deploy
//!   password: secret
//!   name: deploy
//! notifications:
//!   feishu:
//!     url: https://open.feishu.cn/open-apis/bot/v2/hook/xxxx
//!     secret: signing-secret
//! ```

use clap::{Parser, Subcommand};
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;
use crate::notify::events::{DeployMode, DeployStatus};
use crate::types::ApplyId;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "DEPLOYBOT_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit
    #[arg(long)]
    pub validate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Send one deployment notification and wait for it to finish
    Send {
        /// Apply (deployment request) id
        #[arg(long)]
        apply_id: ApplyId,
        /// Deployment outcome: success or failure
        #[arg(long)]
        status: DeployStatus,
        /// Deployment mode: branch or tag
        #[arg(long, default_value = "branch")]
        mode: DeployMode,
        /// Free-form title of the deployment
        #[arg(long, default_value = "")]
        title: String,
    },
    /// Read newline-delimited JSON deployment events from stdin
    Listen,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL where the deployment UI is reachable (e.g. "https://deploy.example.com").
    /// Deploy links in notifications point at `{app_host}/deploy/deploy?id={apply_id}`.
    pub app_host: String,
    /// MySQL connection settings
    pub database: DatabaseConfig,
    /// Chat notification settings
    pub notifications: NotificationsConfig,
    /// Commit message lookup settings
    pub git: GitConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_host: "http://localhost:8878".to_string(),
            database: DatabaseConfig::default(),
            notifications: NotificationsConfig::default(),
            git: GitConfig::default(),
            enable_otel_export: false,
        }
    }
}

/// MySQL connection settings.
///
/// When `unix_socket` is set it takes precedence over `host`/`port`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unix_socket: Option<String>,
    pub user: String,
    pub password: String,
    /// Database (schema) name
    pub name: String,
    pub charset: String,
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            unix_socket: None,
            user: "root".to_string(),
            password: String::new(),
            name: "syncd".to_string(),
            charset: "utf8mb4".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Connection pool limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Connections kept open while idle
    pub max_idle_conns: u32,
    /// Maximum number of open connections
    pub max_open_conns: u32,
    /// Maximum lifetime of a connection (seconds, 0 = never recycled)
    pub conn_max_lifetime_secs: u64,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_idle_conns: 2,
            max_open_conns: 10,
            conn_max_lifetime_secs: 1800,
            acquire_timeout_secs: 30,
        }
    }
}

/// Deployment notification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Send notifications at all (default: true)
    pub enabled: bool,
    /// Maximum notifications being delivered at the same time (default: 8)
    pub max_in_flight: usize,
    /// Events buffered while all workers are busy; further events are dropped (default: 256)
    pub queue_capacity: usize,
    /// How long shutdown waits for in-flight deliveries (default: 10s)
    #[serde(with = "humantime_serde")]
    pub drain_timeout: Duration,
    /// Chat platform webhook
    pub feishu: FeishuConfig,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_in_flight: 8,
            queue_capacity: 256,
            drain_timeout: Duration::from_secs(10),
            feishu: FeishuConfig::default(),
        }
    }
}

/// Signed chat webhook target.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeishuConfig {
    /// Webhook URL of the chat bot
    pub url: String,
    /// Shared signing secret configured on the bot
    pub secret: String,
    /// HTTP timeout in seconds; the client default applies when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Repository to read the latest commit message from (default: current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the file named in `args`, apply env overrides and validate.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            .merge(Yaml::file(&args.config))
            // DEPLOYBOT_CONFIG names the file itself, not a config key
            .merge(Env::prefixed("DEPLOYBOT_").ignore(&["config"]).split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        let pool = &self.database.pool;
        if pool.max_open_conns < 1 {
            return Err(Error::InvalidConfig {
                message: "database.pool.max_open_conns must be at least 1".to_string(),
            });
        }
        if pool.max_idle_conns > pool.max_open_conns {
            return Err(Error::InvalidConfig {
                message: format!(
                    "database.pool.max_idle_conns ({}) cannot be greater than max_open_conns ({})",
                    pool.max_idle_conns, pool.max_open_conns
                ),
            });
        }

        let notifications = &self.notifications;
        if !notifications.enabled {
            return Ok(());
        }

        validate_http_url("app_host", &self.app_host)?;
        validate_http_url("notifications.feishu.url", &notifications.feishu.url)?;

        if notifications.feishu.secret.is_empty() {
            return Err(Error::InvalidConfig {
                message: "notifications.feishu.secret is required when notifications are enabled. \
                          Set DEPLOYBOT_NOTIFICATIONS__FEISHU__SECRET or add it to the config file."
                    .to_string(),
            });
        }
        if notifications.max_in_flight < 1 {
            return Err(Error::InvalidConfig {
                message: "notifications.max_in_flight must be at least 1".to_string(),
            });
        }
        if notifications.queue_capacity < 1 {
            return Err(Error::InvalidConfig {
                message: "notifications.queue_capacity must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), Error> {
    let url = Url::parse(value).map_err(|e| Error::InvalidConfig {
        message: format!("{field} is not a valid URL ({value:?}): {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::InvalidConfig {
            message: format!("{field} must use http or https, got {other}"),
        }),
    }
}
