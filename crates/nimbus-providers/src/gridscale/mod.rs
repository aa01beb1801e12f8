//! gridscale dialect
//!
//! gridscale authenticates with a user id and an API token in two headers and
//! processes writes asynchronously; in synchronous mode (the default here)
//! every write waits on `/requests/<uuid>` before returning.

use std::sync::Arc;

use nimbus_core::config::{self, ConfigBuilder};
use nimbus_core::{Config, Error, ErrorKind, HeaderAuth, HttpClient, Result};
use uuid::Uuid;

pub mod network;
pub mod paas;
pub mod server;
pub mod storage;

pub use network::{Network, NetworkCreateRequest, NetworkCreateResponse};
pub use paas::{PaaSService, PaaSServiceUpdateRequest, ResourceLimit, WORKER_NODE_COUNT_PARAM};
pub use server::{Server, ServerCreateRequest, ServerCreateResponse, ServerUpdateRequest};
pub use storage::{Storage, StorageCreateRequest, StorageCreateResponse, StorageType};

/// Canonical API host
pub const DEFAULT_API_URL: &str = "https://api.gridscale.io";

pub const USER_ID_HEADER: &str = "X-Auth-UserId";
pub const TOKEN_HEADER: &str = "X-Auth-Token";

/// Prefix of the `GRIDSCALE_*` environment variables
pub const ENV_PREFIX: &str = "GRIDSCALE";

/// Defaults: canonical host, synchronous, 1000 ms delay, 5 retries
pub fn default_config(user_id: impl Into<String>, token: impl Into<String>) -> ConfigBuilder {
    Config::builder(DEFAULT_API_URL)
        .principal(user_id)
        .secret(token)
        .user_agent(config::user_agent("nimbus-gridscale", crate::VERSION))
        .synchronous(true)
        .delay_ms(1000)
        .max_retries(5)
        .request_status_path("/requests")
}

/// gridscale API client
#[derive(Debug, Clone)]
pub struct GridscaleClient {
    http: HttpClient,
}

impl GridscaleClient {
    pub fn new(config: Config) -> Result<Self> {
        let auth = HeaderAuth::new(
            USER_ID_HEADER,
            config.principal(),
            TOKEN_HEADER,
            config.secret(),
        )?;
        Ok(Self {
            http: HttpClient::new(config, Arc::new(auth)),
        })
    }

    /// Client from [`default_config`] overlaid with `GRIDSCALE_*` variables
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env(ENV_PREFIX, default_config("", ""))?)
    }

    /// The underlying executor, for endpoints without a typed wrapper
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn synchronous(&self) -> bool {
        self.http.config().synchronous()
    }
}

/// Reject ids that are empty or not UUIDs before anything is sent
pub(crate) fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::wrap(ErrorKind::IdEmpty, "'id' is empty"));
    }
    Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|e| Error::wrap(ErrorKind::ValidationFailed, format!("'id' is invalid: {}", e)))
}
