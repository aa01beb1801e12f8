//! Client configuration
//!
//! A [`Config`] is built once per client through [`ConfigBuilder`], validated,
//! and never mutated afterwards. The executor shares it behind an `Arc`.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Default delay between retries and between completion polls
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Default path of the async request-status endpoint
pub const DEFAULT_REQUEST_STATUS_PATH: &str = "/requests";

/// Default per-request timeout of the HTTP client built when none is supplied
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// `<lib>/<version> (<os>)`
pub fn user_agent(library: &str, version: &str) -> String {
    format!("{}/{} ({})", library, version, env::consts::OS)
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid value '{value}' for environment variable {var}")]
    InvalidEnv { var: String, value: String },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::wrap(ErrorKind::ValidationFailed, err)
    }
}

/// Immutable client configuration
#[derive(Clone)]
pub struct Config {
    base_url: String,
    principal: String,
    secret: String,
    user_agent: String,
    debug: bool,
    synchronous: bool,
    max_retries: u32,
    delay: Duration,
    extra_headers: HeaderMap,
    request_status_path: String,
    http_client: reqwest::Client,
}

impl Config {
    /// Start building a configuration for `base_url`
    pub fn builder(base_url: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(base_url)
    }

    /// `defaults` overlaid with `<PREFIX>_*` environment variables
    pub fn from_env(prefix: &str, defaults: ConfigBuilder) -> Result<Config> {
        defaults.with_env(prefix)?.build()
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authentication principal; may be empty for bearer-only providers
    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Whether outgoing headers are logged at debug level
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Whether writes wait for async completion before returning
    pub fn synchronous(&self) -> bool {
        self.synchronous
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Base delay for linear back-off and completion polling
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    pub fn request_status_path(&self) -> &str {
        &self.request_status_path
    }

    /// The HTTP client handle; TLS, pooling and timeouts belong to the application
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("debug", &self.debug)
            .field("synchronous", &self.synchronous)
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .field("extra_headers", &self.extra_headers.keys().collect::<Vec<_>>())
            .field("request_status_path", &self.request_status_path)
            .finish()
    }
}

/// Builder for [`Config`]
#[derive(Clone)]
pub struct ConfigBuilder {
    base_url: String,
    principal: String,
    secret: String,
    user_agent: Option<String>,
    debug: bool,
    synchronous: bool,
    max_retries: u32,
    delay: Duration,
    extra_headers: Vec<(String, String)>,
    request_status_path: String,
    http_client: Option<reqwest::Client>,
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("base_url", &self.base_url)
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("debug", &self.debug)
            .field("synchronous", &self.synchronous)
            .field("max_retries", &self.max_retries)
            .field("delay", &self.delay)
            .field(
                "extra_headers",
                &self.extra_headers.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("request_status_path", &self.request_status_path)
            .field("http_client", &self.http_client.is_some())
            .finish()
    }
}

impl ConfigBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            principal: String::new(),
            secret: String::new(),
            user_agent: None,
            debug: false,
            synchronous: false,
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
            extra_headers: Vec::new(),
            request_status_path: DEFAULT_REQUEST_STATUS_PATH.to_string(),
            http_client: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = principal.into();
        self
    }

    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = secret.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn synchronous(mut self, synchronous: bool) -> Self {
        self.synchronous = synchronous;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay_ms(self, millis: u64) -> Self {
        self.delay(Duration::from_millis(millis))
    }

    /// Add an extra request header; a later value for the same name wins
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    pub fn request_status_path(mut self, path: impl Into<String>) -> Self {
        self.request_status_path = path.into();
        self
    }

    /// Use an application-owned HTTP client instead of the default one
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Overlay `<PREFIX>_*` environment variables, reading `.env` first
    ///
    /// Recognised suffixes: `API_URL`, `USER_ID`, `API_TOKEN`, `DEBUG`,
    /// `SYNC`, `DELAY_MS`, `MAX_RETRIES`. Unset variables leave the builder
    /// untouched.
    pub fn with_env(mut self, prefix: &str) -> Result<Self> {
        dotenv::dotenv().ok();

        if let Some(url) = read_env(prefix, "API_URL") {
            self.base_url = url;
        }
        if let Some(principal) = read_env(prefix, "USER_ID") {
            self.principal = principal;
        }
        if let Some(secret) = read_env(prefix, "API_TOKEN") {
            self.secret = secret;
        }
        if let Some(debug) = parse_env::<BoolFlag>(prefix, "DEBUG")? {
            self.debug = debug.0;
        }
        if let Some(sync) = parse_env::<BoolFlag>(prefix, "SYNC")? {
            self.synchronous = sync.0;
        }
        if let Some(millis) = parse_env::<u64>(prefix, "DELAY_MS")? {
            self.delay = Duration::from_millis(millis);
        }
        if let Some(retries) = parse_env::<u32>(prefix, "MAX_RETRIES")? {
            self.max_retries = retries;
        }
        Ok(self)
    }

    /// Validate and freeze the configuration
    ///
    /// Retry count and delay are unsigned by construction, so only the base
    /// URL, headers and request-status path need checking here.
    pub fn build(self) -> Result<Config> {
        let base_url = validate_base_url(&self.base_url)?;

        let mut extra_headers = HeaderMap::new();
        for (name, value) in &self.extra_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            extra_headers.insert(header_name, header_value);
        }

        if !self.request_status_path.starts_with('/') {
            return Err(Error::wrap(
                ErrorKind::ValidationFailed,
                format!(
                    "request status path '{}' must begin with '/'",
                    self.request_status_path
                ),
            ));
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(DEFAULT_HTTP_TIMEOUT)
                .build()
                .map_err(ConfigError::HttpClient)?,
        };

        Ok(Config {
            base_url,
            principal: self.principal,
            secret: self.secret,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| user_agent("nimbus", crate::VERSION)),
            debug: self.debug,
            synchronous: self.synchronous,
            max_retries: self.max_retries,
            delay: self.delay,
            extra_headers,
            request_status_path: self.request_status_path.trim_end_matches('/').to_string(),
            http_client,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "base URL must be absolute".to_string(),
        }
        .into());
    }
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

fn read_env(prefix: &str, suffix: &str) -> Option<String> {
    env::var(format!("{}_{}", prefix, suffix))
        .ok()
        .filter(|value| !value.is_empty())
}

fn parse_env<T: FromStr>(prefix: &str, suffix: &str) -> Result<Option<T>> {
    match read_env(prefix, suffix) {
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            ConfigError::InvalidEnv {
                var: format!("{}_{}", prefix, suffix),
                value,
            }
            .into()
        }),
        None => Ok(None),
    }
}

struct BoolFlag(bool);

impl FromStr for BoolFlag {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(BoolFlag(true)),
            "0" | "false" | "no" | "off" => Ok(BoolFlag(false)),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder("https://api.example.com/").build().unwrap();
        assert_eq!(config.base_url(), "https://api.example.com");
        assert_eq!(config.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(config.delay(), DEFAULT_DELAY);
        assert_eq!(config.request_status_path(), "/requests");
        assert!(!config.synchronous());
        assert!(config.user_agent().starts_with("nimbus/"));
        assert!(config.user_agent().contains(env::consts::OS));
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let err = Config::builder("/v2").build().unwrap_err();
        assert!(err.is(ErrorKind::ValidationFailed));
        assert!(err.to_string().contains("invalid base URL"));

        let err = Config::builder("ftp://files.example.com").build().unwrap_err();
        assert!(err.is(ErrorKind::ValidationFailed));
    }

    #[test]
    fn test_extra_headers_last_write_wins() {
        let config = Config::builder("https://api.example.com")
            .header("X-Trace", "first")
            .header("x-trace", "second")
            .build()
            .unwrap();
        assert_eq!(config.extra_headers().get("x-trace").unwrap(), "second");
        assert_eq!(config.extra_headers().len(), 1);
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let err = Config::builder("https://api.example.com")
            .header("bad header", "x")
            .build()
            .unwrap_err();
        assert!(err.is(ErrorKind::ValidationFailed));
    }

    #[test]
    fn test_debug_output_hides_secret() {
        let config = Config::builder("https://api.example.com")
            .secret("super-secret-token")
            .build()
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-token"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_builder_debug_hides_secret() {
        let builder = Config::builder("https://api.example.com")
            .principal("user-1")
            .secret("super-secret-token")
            .header("X-Auth-Extra", "also-secret");
        let rendered = format!("{:?}", builder);
        assert!(!rendered.contains("super-secret-token"));
        assert!(!rendered.contains("also-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("user-1"));
        assert!(rendered.contains("X-Auth-Extra"));
    }

    #[test]
    #[serial]
    fn test_env_overlay() {
        env::set_var("NIMBUSTEST_API_URL", "https://env.example.com");
        env::set_var("NIMBUSTEST_API_TOKEN", "env-token");
        env::set_var("NIMBUSTEST_SYNC", "true");
        env::set_var("NIMBUSTEST_DELAY_MS", "250");
        env::set_var("NIMBUSTEST_MAX_RETRIES", "2");

        let config = Config::builder("https://api.example.com")
            .with_env("NIMBUSTEST")
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(config.base_url(), "https://env.example.com");
        assert_eq!(config.secret(), "env-token");
        assert!(config.synchronous());
        assert_eq!(config.delay(), Duration::from_millis(250));
        assert_eq!(config.max_retries(), 2);

        for suffix in ["API_URL", "API_TOKEN", "SYNC", "DELAY_MS", "MAX_RETRIES"] {
            env::remove_var(format!("NIMBUSTEST_{}", suffix));
        }
    }

    #[test]
    #[serial]
    fn test_env_overlay_rejects_garbage() {
        env::set_var("NIMBUSBAD_MAX_RETRIES", "many");
        let err = Config::builder("https://api.example.com")
            .with_env("NIMBUSBAD")
            .unwrap_err();
        assert!(err.is(ErrorKind::ValidationFailed));
        assert!(err.to_string().contains("NIMBUSBAD_MAX_RETRIES"));
        env::remove_var("NIMBUSBAD_MAX_RETRIES");
    }
}
