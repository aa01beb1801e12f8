//! HTTP error classification
//!
//! Turns a non-2xx response into an [`Error`] whose kind comes from the status
//! code first and, for statuses without a fixed kind, from the provider's
//! symbolic `code` field. Transport failures from `reqwest` become `Timeout`.

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, ErrorKind};

/// Maps a provider error code to a kind; `None` means the code is unknown
pub type CodeResolver = fn(&str) -> Option<ErrorKind>;

/// Permissive shape of a provider error body
///
/// Every field is optional and `status` may arrive as a number or a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<u16>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reason: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub result: Option<String>,
}

impl ErrorBody {
    /// Parse a JSON object body; anything else yields `None`
    pub fn parse(body: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(body).ok()? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// `reason[, details]`, falling back to `description` then `message`
    pub fn summary(&self) -> Option<String> {
        match (&self.reason, &self.details) {
            (Some(reason), Some(details)) => Some(format!("{}, {}", reason, details)),
            (Some(reason), None) => Some(reason.clone()),
            _ => self
                .description
                .clone()
                .or_else(|| self.message.clone())
                .or_else(|| self.details.clone()),
        }
    }

    pub fn requires_authentication(&self) -> bool {
        self.result.as_deref() == Some("requires_authentication")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A provider answered with an error status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: u16,
    pub request_id: Option<String>,
    pub code: Option<String>,
    pub description: String,
}

impl ApiError {
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Status code: {}. Error: {}. Request UUID: {}.",
            self.status,
            self.description,
            display_id(&self.request_id)
        )?;
        if self.is_server_error() {
            write!(
                f,
                " Please report this error along with the request UUID {}.",
                display_id(&self.request_id)
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// The HTTP request could not be completed
#[derive(Debug, thiserror::Error)]
#[error("{message}: {source}")]
pub struct TransportError {
    message: &'static str,
    #[source]
    source: reqwest::Error,
}

impl TransportError {
    pub fn reqwest_error(&self) -> &reqwest::Error {
        &self.source
    }
}

/// A 2xx body did not match the expected shape
#[derive(Debug, thiserror::Error)]
#[error("failed to decode response body (status {status}, request UUID {}): {source}", display_id(.request_id))]
pub struct DecodeError {
    pub status: u16,
    pub request_id: Option<String>,
    #[source]
    pub source: serde_json::Error,
}

fn display_id(id: &Option<String>) -> &str {
    id.as_deref().unwrap_or("-")
}

/// Kind fixed by the status code alone
pub fn status_kind(status: StatusCode) -> Option<ErrorKind> {
    match status.as_u16() {
        401 | 403 => Some(ErrorKind::Unauthorized),
        404 => Some(ErrorKind::NotFound),
        409 => Some(ErrorKind::Conflict),
        424 => Some(ErrorKind::FailedDependency),
        429 => Some(ErrorKind::RateLimited),
        500 => Some(ErrorKind::Internal),
        503 => Some(ErrorKind::ServiceUnavailable),
        _ => None,
    }
}

/// Build the error for a response with status >= 300
///
/// When the body carries a code that resolves to a different kind than the
/// status, both appear in the chain so `is` matches either.
pub fn classify_response(
    status: StatusCode,
    request_id: Option<String>,
    body: &[u8],
    resolver: Option<CodeResolver>,
) -> Error {
    let parsed = ErrorBody::parse(body);
    let text = String::from_utf8_lossy(body).trim().to_string();

    let description = parsed
        .as_ref()
        .and_then(ErrorBody::summary)
        .or_else(|| (!text.is_empty()).then(|| text.clone()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    let api = ApiError {
        status: status.as_u16(),
        request_id,
        code: parsed.as_ref().and_then(|b| b.code.clone()),
        description,
    };

    let code_kind = parsed.as_ref().and_then(|b| body_kind(b, resolver));

    match (status_kind(status), code_kind) {
        (Some(kind), Some(inner)) if inner != kind => {
            Error::wrap(kind, Error::wrap(inner, api))
        }
        (Some(kind), _) => Error::wrap(kind, api),
        (None, Some(inner)) => Error::wrap(inner, api),
        (None, None) => {
            let kind = match &parsed {
                _ if api.is_server_error() => ErrorKind::Internal,
                None if !text.is_empty() => ErrorKind::Decode,
                _ => ErrorKind::Unknown,
            };
            Error::wrap(kind, api)
        }
    }
}

fn body_kind(body: &ErrorBody, resolver: Option<CodeResolver>) -> Option<ErrorKind> {
    if body.requires_authentication() {
        return Some(ErrorKind::Unauthorized);
    }
    if body.status == Some(500) {
        return Some(ErrorKind::Internal);
    }
    let code = body.code.as_deref()?;
    Some(
        resolver
            .and_then(|resolve| resolve(code))
            .unwrap_or(ErrorKind::Unknown),
    )
}

/// Map a `reqwest` failure onto the taxonomy
pub fn transport_error(err: reqwest::Error) -> Error {
    if err.is_builder() {
        return Error::wrap(ErrorKind::ValidationFailed, err);
    }
    let message = if err.is_timeout() {
        "we found a network issue"
    } else if err.is_connect() {
        "we found a problem connected against the api"
    } else {
        "the request could not be completed"
    };
    Error::wrap(
        ErrorKind::Timeout,
        TransportError {
            message,
            source: err,
        },
    )
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        transport_error(err)
    }
}
