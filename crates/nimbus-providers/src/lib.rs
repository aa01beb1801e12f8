//! Nimbus Providers - gridscale and Civo clients
//!
//! Each dialect supplies its authentication scheme, default configuration,
//! error-code table and the handful of resources a node autoscaler needs.
//! Request execution, retries and completion waiting live in `nimbus-core`.

pub mod civo;
pub mod gridscale;
pub mod lookup;

pub use lookup::{find_by_id_or_name, LookupError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
