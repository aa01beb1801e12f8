//! Description of one outgoing call, built by the resource layer and consumed
//! once by the executor

use reqwest::Method;
use serde::Serialize;

use crate::error::Result;

/// One outgoing HTTP call relative to the configured base URL
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    uri: String,
    body: Option<Vec<u8>>,
    query: Vec<(String, String)>,
    skip_completion_wait: bool,
    caller: &'static str,
}

impl RequestDescriptor {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            query: Vec::new(),
            skip_completion_wait: false,
            caller: "unknown",
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: impl Into<String>) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: impl Into<String>) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn patch(uri: impl Into<String>) -> Self {
        Self::new(Method::PATCH, uri)
    }

    pub fn delete(uri: impl Into<String>) -> Self {
        Self::new(Method::DELETE, uri)
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Add a query parameter
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Never poll for async completion, even in synchronous mode
    pub fn skip_completion_wait(mut self) -> Self {
        self.skip_completion_wait = true;
        self
    }

    /// Name of the operation recorded in the per-attempt trace event
    pub fn caller(mut self, caller: &'static str) -> Self {
        self.caller = caller;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn skips_completion_wait(&self) -> bool {
        self.skip_completion_wait
    }

    pub fn caller_name(&self) -> &'static str {
        self.caller
    }

    /// Anything but GET and HEAD
    pub fn is_write(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }
}
