//! MySQL connection pool setup.
//!
//! Maps [`DatabaseConfig`] onto SQLx connect and pool options:
//!
//! | config                    | sqlx                     |
//! |---------------------------|--------------------------|
//! | `unix_socket`             | `socket` (wins over host)|
//! | `host` / `port`           | `host` / `port`          |
//! | `pool.max_open_conns`     | `max_connections`        |
//! | `pool.max_idle_conns`     | `min_connections`        |
//! | `pool.conn_max_lifetime_secs` | `max_lifetime` (0 = none) |
//! | `pool.acquire_timeout_secs`   | `acquire_timeout`     |

use std::time::Duration;

use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::info;

use crate::config::{DatabaseConfig, PoolSettings};

pub fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .username(&config.user)
        .database(&config.name)
        .charset(&config.charset);

    if !config.password.is_empty() {
        options = options.password(&config.password);
    }

    match &config.unix_socket {
        Some(socket) => options.socket(socket),
        None => options.host(&config.host).port(config.port),
    }
}

pub fn pool_options(settings: &PoolSettings) -> MySqlPoolOptions {
    let max_lifetime = (settings.conn_max_lifetime_secs > 0).then(|| Duration::from_secs(settings.conn_max_lifetime_secs));

    MySqlPoolOptions::new()
        .max_connections(settings.max_open_conns)
        .min_connections(settings.max_idle_conns)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .max_lifetime(max_lifetime)
}

/// Open the pool and verify the database is reachable.
pub async fn connect(config: &DatabaseConfig) -> Result<MySqlPool, sqlx::Error> {
    let pool = pool_options(&config.pool).connect_with(connect_options(config)).await?;

    info!(
        database = %config.name,
        max_open_conns = config.pool.max_open_conns,
        "Connected to MySQL"
    );

    Ok(pool)
}
