//! Create the connection pool the configuration describes.

use std::str::FromStr;
use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};

use crate::configuration::Configuration;

/// Create a connection pool. Connections are opened on first use.
pub fn create_pool(configuration: &Configuration) -> Result<MySqlPool, sqlx::Error> {
    let connect_options = MySqlConnectOptions::from_str(&configuration.connection_uri)?;
    let settings = &configuration.pool_settings;

    tracing::info!(
        max_connections = settings.max_connections,
        pool_timeout = settings.pool_timeout,
        "Creating connection pool"
    );
    Ok(MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.pool_timeout))
        .idle_timeout(settings.idle_timeout.map(Duration::from_secs))
        .max_lifetime(settings.connection_lifetime.map(Duration::from_secs))
        .connect_lazy_with(connect_options))
}
