//! Nimbus Core - request execution for IaaS provider clients
//!
//! This crate holds everything the provider dialects share:
//!
//! - **Error Handling**: a closed [`ErrorKind`] taxonomy with cause chains
//! - **Configuration**: immutable [`Config`] built and validated once per client
//! - **Cancellation**: [`Context`] carrying a cancellation token and deadline
//! - **Request Executor**: [`HttpClient`] with retries, rate-limit waits and
//!   async completion
//! - **Logging**: optional subscriber setup in [`logging`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nimbus_core::{BearerAuth, Config, Context, HttpClient, RequestDescriptor, Result};
//!
//! async fn example() -> Result<()> {
//!     let config = Config::builder("https://api.example.com").build()?;
//!     let client = HttpClient::new(config, Arc::new(BearerAuth::new("token")));
//!     let servers: serde_json::Value = client
//!         .execute(&Context::background(), RequestDescriptor::get("/v2/servers"))
//!         .await?;
//!     println!("{}", servers);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod logging;

pub use config::{Config, ConfigBuilder, ConfigError};
pub use context::Context;
pub use error::{BoxError, ContextError, Error, ErrorKind, Result};
pub use http::{
    AuthHandler, BearerAuth, CodeResolver, HeaderAuth, HttpClient, RequestDescriptor,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
