//! Request executor
//!
//! Turns a [`RequestDescriptor`] into authenticated HTTP attempts, retries the
//! transient failures, waits out rate limits and, in synchronous mode, waits
//! for async completion of writes before returning.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::config::{Config, ConfigError};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::http::auth::{redact_headers, AuthHandler};
use crate::http::completion::request_uuid;
use crate::http::descriptor::RequestDescriptor;
use crate::http::error::{classify_response, transport_error, CodeResolver, DecodeError};
use crate::http::rate_limit::{rate_limit_wait, request_id, retry_after};
use crate::http::retry::{RetryDecision, RetryHandler, RetryPolicy};

/// A completed HTTP exchange with a 2xx status
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON into `T`
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|source| {
            Error::wrap(
                ErrorKind::Decode,
                DecodeError {
                    status: self.status.as_u16(),
                    request_id: self.request_id.clone(),
                    source,
                },
            )
        })
    }
}

/// Executor shared by every operation of one provider client
#[derive(Debug, Clone)]
pub struct HttpClient {
    config: Arc<Config>,
    auth: Arc<dyn AuthHandler>,
    code_resolver: Option<CodeResolver>,
}

impl HttpClient {
    pub fn new(config: Config, auth: Arc<dyn AuthHandler>) -> Self {
        Self {
            config: Arc::new(config),
            auth,
            code_resolver: None,
        }
    }

    /// Resolve provider error codes with `resolver`; unresolved codes are `Unknown`
    pub fn with_code_resolver(mut self, resolver: CodeResolver) -> Self {
        self.code_resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `descriptor` and decode the 2xx body into `T`
    pub async fn execute<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        descriptor: RequestDescriptor,
    ) -> Result<T> {
        self.run(ctx, descriptor).await?.decode()
    }

    /// Run `descriptor` and discard the 2xx body
    pub async fn execute_unit(&self, ctx: &Context, descriptor: RequestDescriptor) -> Result<()> {
        self.run(ctx, descriptor).await.map(|_| ())
    }

    /// Send, then wait for async completion when the configuration asks for it
    async fn run(&self, ctx: &Context, descriptor: RequestDescriptor) -> Result<ApiResponse> {
        let response = self.send(ctx, &descriptor).await?;

        if self.config.synchronous() && !descriptor.skips_completion_wait() && descriptor.is_write()
        {
            if let Some(id) = request_uuid(&response.body) {
                self.wait_for_request(ctx, &id).await?;
            }
        }
        Ok(response)
    }

    /// Dispatch with retries and rate-limit waits; no completion wait
    pub(crate) async fn send(
        &self,
        ctx: &Context,
        descriptor: &RequestDescriptor,
    ) -> Result<ApiResponse> {
        if !descriptor.uri().starts_with('/') {
            return Err(Error::wrap(
                ErrorKind::ValidationFailed,
                format!("request URI '{}' must begin with '/'", descriptor.uri()),
            ));
        }
        let url = format!("{}{}", self.config.base_url(), descriptor.uri());
        let mut retry = RetryHandler::new(RetryPolicy::from_config(&self.config));

        loop {
            ctx.check()?;

            let started = Instant::now();
            let outcome = self.attempt(ctx, descriptor, &url).await;
            self.trace_attempt(descriptor, &outcome, started);

            let (status, error, hint) = match outcome {
                Ok(response) if response.status.is_success() => return Ok(response),
                Ok(response) => {
                    if let Some(reason) = ctx.err() {
                        log::warn!(
                            "Request {} {} interrupted by context, discarding status {}",
                            descriptor.method(),
                            descriptor.uri(),
                            response.status
                        );
                        return Err(reason.into());
                    }
                    if response.status == StatusCode::TOO_MANY_REQUESTS {
                        let wait =
                            rate_limit_wait(&response.headers, Utc::now(), self.config.delay());
                        tracing::debug!(
                            path = descriptor.uri(),
                            wait_ms = wait.as_millis() as u64,
                            "rate limited, waiting for reset"
                        );
                        ctx.sleep(wait).await?;
                        continue;
                    }
                    let hint = retry_after(&response.headers);
                    let error = classify_response(
                        response.status,
                        response.request_id,
                        &response.body,
                        self.code_resolver,
                    );
                    (Some(response.status), error, hint)
                }
                Err(error) => {
                    if let Some(reason) = ctx.err() {
                        log::warn!("Request interrupted by context: {}", error);
                        return Err(reason.into());
                    }
                    (None, error, None)
                }
            };

            match retry.should_retry(status, &error, hint, descriptor.method()) {
                RetryDecision::Retry { delay } => {
                    log::warn!(
                        "Request {} {} failed (retry {}), retrying after {:?}: {}",
                        descriptor.method(),
                        descriptor.uri(),
                        retry.retries(),
                        delay,
                        error
                    );
                    ctx.sleep(delay).await?;
                }
                RetryDecision::NoRetry => return Err(error),
                RetryDecision::Exhausted => {
                    log::error!(
                        "Request {} {} failed after {} retries, giving up: {}",
                        descriptor.method(),
                        descriptor.uri(),
                        retry.retries(),
                        error
                    );
                    return Err(retry.exhausted(error));
                }
            }
        }
    }

    /// Exactly one HTTP round-trip; any received status is `Ok`
    async fn attempt(
        &self,
        ctx: &Context,
        descriptor: &RequestDescriptor,
        url: &str,
    ) -> Result<ApiResponse> {
        let headers = self.request_headers()?;

        let mut request = self
            .config
            .http_client()
            .request(descriptor.method().clone(), url)
            .headers(headers)
            .body(descriptor.body().map(<[u8]>::to_vec).unwrap_or_default());
        if !descriptor.query_params().is_empty() {
            request = request.query(descriptor.query_params());
        }
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let request_id = request_id(&headers);
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(ApiResponse {
            status,
            request_id,
            headers,
            body: body.to_vec(),
        })
    }

    /// Defaults, then extra headers, then authentication
    fn request_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let user_agent =
            HeaderValue::from_str(self.config.user_agent()).map_err(|e| ConfigError::InvalidHeader {
                name: USER_AGENT.to_string(),
                reason: e.to_string(),
            })?;
        headers.insert(USER_AGENT, user_agent);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in self.config.extra_headers() {
            headers.insert(name.clone(), value.clone());
        }

        self.auth.apply_auth(&mut headers)?;

        if self.config.debug() {
            let shown = redact_headers(&headers, &self.auth.sensitive_headers());
            tracing::debug!(headers = ?shown, "outgoing request headers");
        }
        Ok(headers)
    }

    fn trace_attempt(
        &self,
        descriptor: &RequestDescriptor,
        outcome: &Result<ApiResponse>,
        started: Instant,
    ) {
        let (status, request_id) = match outcome {
            Ok(response) => (
                response.status.as_u16(),
                response.request_id.as_deref().unwrap_or(""),
            ),
            Err(_) => (0, ""),
        };
        tracing::trace!(
            caller = descriptor.caller_name(),
            method = %descriptor.method(),
            path = descriptor.uri(),
            status,
            request_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            success = matches!(outcome, Ok(r) if r.status.is_success()),
            "api request"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::auth::HeaderAuth;

    fn client(config: Config) -> HttpClient {
        let auth = HeaderAuth::new("X-Auth-UserId", "user", "X-Auth-Token", "token").unwrap();
        HttpClient::new(config, Arc::new(auth))
    }

    #[test]
    fn test_auth_headers_win_over_extra_headers() {
        let config = Config::builder("https://api.example.com")
            .header("X-Auth-Token", "from-extra")
            .header("User-Agent", "custom-agent")
            .build()
            .unwrap();
        let headers = client(config).request_headers().unwrap();

        assert_eq!(headers.get("x-auth-token").unwrap(), "token");
        assert_eq!(headers.get("x-auth-userid").unwrap(), "user");
        assert_eq!(headers.get(USER_AGENT).unwrap(), "custom-agent");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_relative_uri_is_rejected_before_dispatch() {
        let config = Config::builder("https://api.example.com").build().unwrap();
        let err = client(config)
            .execute_unit(&Context::background(), RequestDescriptor::get("v2/servers"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    }

    #[tokio::test]
    async fn test_cancelled_context_never_dispatches() {
        let config = Config::builder("http://127.0.0.1:9").build().unwrap();
        let ctx = Context::background();
        ctx.cancel();
        let err = client(config)
            .execute_unit(&ctx, RequestDescriptor::get("/v2/servers"))
            .await
            .unwrap_err();
        assert!(err.is(ErrorKind::Timeout));
    }

    #[test]
    fn test_decode_failure_carries_request_id() {
        let response = ApiResponse {
            status: StatusCode::OK,
            request_id: Some("req-7".to_string()),
            headers: HeaderMap::new(),
            body: b"{broken".to_vec(),
        };
        let err = response.decode::<serde_json::Value>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(err.to_string().contains("req-7"));
    }
}
