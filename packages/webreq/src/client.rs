//! The process-wide HTTP clients.
//!
//! Every request executes on one shared `reqwest` client so that idle
//! connections are reused across calls to the same host. Each client is
//! built on first use, exactly once, from the installed [`ClientConfig`]
//! (or the default one if [`configure`] was never called).

use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;
pub const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

static CONFIG: OnceCell<ClientConfig> = OnceCell::new();
static ASYNC_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();
#[cfg(feature = "blocking")]
static BLOCKING_CLIENT: OnceCell<reqwest::blocking::Client> = OnceCell::new();

/// Connection pool and transport settings for the shared clients.
///
/// Deserializable so it can be loaded from a config file. Missing fields
/// take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,

    /// Seconds an idle connection is kept before it is closed.
    pub pool_idle_timeout_secs: u64,

    /// Optional bound on connection establishment, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            pool_idle_timeout_secs: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            connect_timeout_secs: None,
            user_agent: concat!("webreq/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Build a standalone async client with these settings.
    ///
    /// The client carries no overall timeout; execution deadlines come from
    /// the request's [`Scope`](crate::Scope).
    pub fn build_async(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout())
            .user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }

    /// Build a standalone blocking client with these settings.
    ///
    /// The default 30 second blocking timeout is removed; each request sets
    /// its own.
    #[cfg(feature = "blocking")]
    pub fn build_blocking(&self) -> Result<reqwest::blocking::Client, Error> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .pool_idle_timeout(self.pool_idle_timeout())
            .user_agent(self.user_agent.as_str());
        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

/// Install the configuration used to build the shared clients.
///
/// Must be called before the first request executes. Returns
/// [`Error::ClientAlreadyInitialized`] once a configuration is in place,
/// whether installed here or defaulted by a first request.
pub fn configure(config: ClientConfig) -> Result<(), Error> {
    if is_initialized() {
        return Err(Error::ClientAlreadyInitialized);
    }
    CONFIG
        .set(config)
        .map_err(|_| Error::ClientAlreadyInitialized)
}

/// The configuration in effect, defaulting it if none was installed.
pub fn config() -> &'static ClientConfig {
    CONFIG.get_or_init(ClientConfig::default)
}

/// True once either shared client has been built.
pub fn is_initialized() -> bool {
    ASYNC_CLIENT.get().is_some() || blocking_initialized()
}

#[cfg(feature = "blocking")]
fn blocking_initialized() -> bool {
    BLOCKING_CLIENT.get().is_some()
}

#[cfg(not(feature = "blocking"))]
fn blocking_initialized() -> bool {
    false
}

/// The shared async client, built on first call.
pub fn shared() -> Result<&'static reqwest::Client, Error> {
    ASYNC_CLIENT.get_or_try_init(|| {
        let config = config();
        debug!(
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            pool_idle_timeout_secs = config.pool_idle_timeout_secs,
            "building shared async client"
        );
        config.build_async()
    })
}

/// The shared blocking client, built on first call.
///
/// Like every `reqwest::blocking` client it must not be first used from
/// inside an async runtime thread.
#[cfg(feature = "blocking")]
pub fn shared_blocking() -> Result<&'static reqwest::blocking::Client, Error> {
    BLOCKING_CLIENT.get_or_try_init(|| {
        let config = config();
        debug!(
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            pool_idle_timeout_secs = config.pool_idle_timeout_secs,
            "building shared blocking client"
        );
        config.build_blocking()
    })
}
