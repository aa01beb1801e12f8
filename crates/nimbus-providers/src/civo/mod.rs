//! Civo dialect
//!
//! Civo takes a bearer API key, answers writes with the finished resource and
//! scopes every call to a region passed as a query parameter. Error bodies
//! carry a symbolic `code` resolved by [`codes::resolve_code`].

use std::sync::Arc;

use nimbus_core::config::{self, ConfigBuilder};
use nimbus_core::{BearerAuth, Config, Error, ErrorKind, HttpClient, RequestDescriptor, Result};
use serde::Deserialize;

pub mod codes;
pub mod kubernetes;

pub use codes::resolve_code;
pub use kubernetes::{
    InstanceSize, KubernetesCluster, KubernetesInstance, KubernetesPool,
    KubernetesPoolUpdateRequest, PaginatedKubernetesClusters,
};

/// Canonical API host
pub const DEFAULT_API_URL: &str = "https://api.civo.com";

/// Prefix of the `CIVO_*` environment variables
pub const ENV_PREFIX: &str = "CIVO";

/// Defaults: canonical host, no completion polling
pub fn default_config(api_key: impl Into<String>) -> ConfigBuilder {
    Config::builder(DEFAULT_API_URL)
        .secret(api_key)
        .user_agent(config::user_agent("nimbus-civo", crate::VERSION))
        .synchronous(false)
}

/// Plain `{"result": ...}` acknowledgement
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimpleResponse {
    pub result: String,
}

/// Civo API client bound to one region
#[derive(Debug, Clone)]
pub struct CivoClient {
    http: HttpClient,
    region: String,
}

impl CivoClient {
    pub fn new(config: Config, region: impl Into<String>) -> Result<Self> {
        let region = region.into();
        if region.is_empty() {
            return Err(Error::wrap(ErrorKind::ValidationFailed, "region is empty"));
        }
        let auth = BearerAuth::new(config.secret()).with_scheme("bearer");
        Ok(Self {
            http: HttpClient::new(config, Arc::new(auth)).with_code_resolver(resolve_code),
            region,
        })
    }

    /// Client from [`default_config`] overlaid with `CIVO_*` variables;
    /// the region comes from `CIVO_REGION`
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env(ENV_PREFIX, default_config(""))?;
        let region = std::env::var(format!("{}_REGION", ENV_PREFIX)).unwrap_or_default();
        Self::new(config, region)
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Scope `descriptor` to the client's region
    fn scoped(&self, descriptor: RequestDescriptor) -> RequestDescriptor {
        descriptor.query("region", self.region.as_str())
    }
}
