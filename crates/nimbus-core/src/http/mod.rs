//! HTTP layer for provider API communication
//!
//! This module provides:
//! - Request descriptors built by the resource layer
//! - Authentication handling with header redaction
//! - Error classification of responses and transport failures
//! - Retry logic with linear back-off
//! - Rate-limit handling driven by `Ratelimit-Reset`
//! - Async completion polling for providers that need it

pub mod auth;
pub mod client;
pub mod completion;
pub mod descriptor;
pub mod error;
pub mod rate_limit;
pub mod retry;

pub use auth::{mask_secret, AuthHandler, BearerAuth, HeaderAuth};
pub use client::{ApiResponse, HttpClient};
pub use completion::{RequestFailed, RequestState, RequestStatus, RequestStatusMap};
pub use descriptor::RequestDescriptor;
pub use error::{ApiError, CodeResolver, DecodeError, ErrorBody, TransportError};
pub use retry::{RetriesExhausted, RetryDecision, RetryPolicy};

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
