//! Authentication handling for provider APIs
//!
//! Supports two schemes:
//! - A principal/token header pair (gridscale `X-Auth-UserId` / `X-Auth-Token`)
//! - Bearer tokens in `Authorization` (Civo)
//!
//! The executor applies authentication after every other header, so extra
//! headers from the configuration can never replace it.

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

use crate::config::ConfigError;
use crate::error::Result;

/// Replacement for the hidden part of a masked header value
pub const MASK: &str = "*****";

/// Number of leading characters left visible by [`mask_secret`]
pub const VISIBLE_PREFIX: usize = 5;

/// Trait for handling provider-specific authentication
pub trait AuthHandler: Send + Sync + fmt::Debug {
    /// Apply authentication to request headers
    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<()>;

    /// Headers whose values must be masked when logged
    fn sensitive_headers(&self) -> Vec<HeaderName>;
}

/// Principal and token sent in two dedicated headers
#[derive(Clone)]
pub struct HeaderAuth {
    principal_header: HeaderName,
    principal: String,
    token_header: HeaderName,
    token: String,
}

impl HeaderAuth {
    pub fn new(
        principal_header: &str,
        principal: impl Into<String>,
        token_header: &str,
        token: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            principal_header: header_name(principal_header)?,
            principal: principal.into(),
            token_header: header_name(token_header)?,
            token: token.into(),
        })
    }
}

impl fmt::Debug for HeaderAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderAuth")
            .field("principal_header", &self.principal_header)
            .field("principal", &mask_secret(&self.principal))
            .field("token_header", &self.token_header)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

impl AuthHandler for HeaderAuth {
    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<()> {
        headers.insert(
            self.principal_header.clone(),
            sensitive_value(&self.principal_header, &self.principal)?,
        );
        headers.insert(
            self.token_header.clone(),
            sensitive_value(&self.token_header, &self.token)?,
        );
        Ok(())
    }

    fn sensitive_headers(&self) -> Vec<HeaderName> {
        vec![self.principal_header.clone(), self.token_header.clone()]
    }
}

/// `Authorization: <scheme> <token>`
#[derive(Clone)]
pub struct BearerAuth {
    scheme: String,
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            scheme: "Bearer".to_string(),
            token: token.into(),
        }
    }

    /// Override the scheme word; some providers expect lowercase `bearer`
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("scheme", &self.scheme)
            .field("token", &mask_secret(&self.token))
            .finish()
    }
}

impl AuthHandler for BearerAuth {
    fn apply_auth(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = format!("{} {}", self.scheme, self.token);
        headers.insert(AUTHORIZATION, sensitive_value(&AUTHORIZATION, &value)?);
        Ok(())
    }

    fn sensitive_headers(&self) -> Vec<HeaderName> {
        vec![AUTHORIZATION]
    }
}

/// Keep the first five characters and mask the rest; mask short values fully
pub fn mask_secret(value: &str) -> String {
    if value.chars().count() < VISIBLE_PREFIX {
        return MASK.to_string();
    }
    let prefix: String = value.chars().take(VISIBLE_PREFIX).collect();
    format!("{}{}", prefix, MASK)
}

/// Render headers for logging with the sensitive ones masked
pub fn redact_headers(headers: &HeaderMap, sensitive: &[HeaderName]) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let raw = value.to_str().unwrap_or("<binary>");
            let shown = if sensitive.contains(name) {
                mask_secret(raw)
            } else {
                raw.to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ConfigError::InvalidHeader {
            name: name.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn sensitive_value(name: &HeaderName, value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|e| ConfigError::InvalidHeader {
        name: name.as_str().to_string(),
        reason: e.to_string(),
    })?;
    header.set_sensitive(true);
    Ok(header)
}
