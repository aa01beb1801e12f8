//! Async completion waiter
//!
//! Providers that accept a write with `{"request_uuid": ...}` expose the
//! progress of that work at `GET <status path>/<uuid>`, answering
//! `{"<uuid>": {"status": "pending" | "done" | "failed", ...}}`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::http::client::HttpClient;
use crate::http::descriptor::RequestDescriptor;

/// Server-side state of an async request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Pending,
    Done,
    Failed,
    #[serde(other)]
    Unknown,
}

/// One entry of the request-status response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestStatus {
    pub status: RequestState,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub create_time: Option<DateTime<Utc>>,
}

/// Request-status response keyed by request id
pub type RequestStatusMap = HashMap<String, RequestStatus>;

fn lenient_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc)))
}

/// The provider reported the async request as failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("request {request_id} failed: {message}")]
pub struct RequestFailed {
    pub request_id: String,
    pub message: String,
}

/// Body of a write accepted for async processing
#[derive(Debug, Deserialize)]
struct AsyncAck {
    request_uuid: Option<String>,
}

/// The `request_uuid` of a 2xx body, if it has one
pub(crate) fn request_uuid(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<AsyncAck>(body)
        .ok()
        .and_then(|ack| ack.request_uuid)
        .filter(|id| !id.is_empty())
}

impl HttpClient {
    /// Poll the request-status endpoint until `request_id` is done
    ///
    /// Polls every base delay with no cap; only `ctx` bounds the wait.
    /// Each poll goes through the retrying executor, so transient failures of
    /// the status endpoint are absorbed there.
    pub async fn wait_for_request(&self, ctx: &Context, request_id: &str) -> Result<()> {
        if request_id.is_empty() {
            return Err(Error::wrap(ErrorKind::IdEmpty, "request id is empty"));
        }
        let uri = format!("{}/{}", self.config().request_status_path(), request_id);

        loop {
            let descriptor = RequestDescriptor::get(uri.as_str())
                .skip_completion_wait()
                .caller("wait_for_request");
            let response = self.send(ctx, &descriptor).await?;
            let statuses: RequestStatusMap = response.decode()?;

            match statuses.get(request_id) {
                Some(RequestStatus {
                    status: RequestState::Done,
                    ..
                }) => {
                    tracing::debug!(request_id, "async request done");
                    return Ok(());
                }
                Some(RequestStatus {
                    status: RequestState::Failed,
                    message,
                    ..
                }) => {
                    return Err(Error::wrap(
                        ErrorKind::Internal,
                        RequestFailed {
                            request_id: request_id.to_string(),
                            message: message.clone().unwrap_or_default(),
                        },
                    ));
                }
                other => {
                    tracing::trace!(
                        request_id,
                        state = ?other.map(|s| s.status),
                        "async request not finished"
                    );
                    ctx.sleep(self.config().delay()).await?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_map_decodes() {
        let body = br#"{"r1":{"status":"failed","message":"disk full","create_time":"2024-03-01T10:00:00Z"}}"#;
        let map: RequestStatusMap = serde_json::from_slice(body).unwrap();
        let entry = &map["r1"];
        assert_eq!(entry.status, RequestState::Failed);
        assert_eq!(entry.message.as_deref(), Some("disk full"));
        assert!(entry.create_time.is_some());
    }

    #[test]
    fn test_unrecognised_state_is_unknown() {
        let map: RequestStatusMap =
            serde_json::from_slice(br#"{"r1":{"status":"queued","create_time":"yesterday"}}"#)
                .unwrap();
        assert_eq!(map["r1"].status, RequestState::Unknown);
        assert!(map["r1"].create_time.is_none());
    }

    #[test]
    fn test_request_uuid_extraction() {
        assert_eq!(
            request_uuid(br#"{"request_uuid":"r1","object_uuid":"n9"}"#),
            Some("r1".to_string())
        );
        assert_eq!(request_uuid(br#"{"object_uuid":"n9"}"#), None);
        assert_eq!(request_uuid(b""), None);
        assert_eq!(request_uuid(b"[]"), None);
    }

    #[test]
    fn test_request_failed_message() {
        let err = Error::wrap(
            ErrorKind::Internal,
            RequestFailed {
                request_id: "r1".to_string(),
                message: "disk full".to_string(),
            },
        );
        assert_eq!(err.to_string(), "Internal: request r1 failed: disk full");
    }
}
