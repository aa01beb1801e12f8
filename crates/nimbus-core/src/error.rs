//! Error taxonomy for the nimbus clients
//!
//! Every failure surfaced by this workspace carries an [`ErrorKind`] taken
//! from a closed set, so callers can branch on the kind without parsing
//! messages. [`Error`] pairs a kind with an optional inner error and keeps the
//! cause chain intact; [`Error::is`] walks that chain to any depth.

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Boxed inner error carried by [`Error`]
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Symbolic identity of a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network I/O, DNS, connection failure or an expired/cancelled context
    Timeout,
    /// 401/403 or a body flagged `requires_authentication`
    Unauthorized,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 429
    RateLimited,
    /// 424
    FailedDependency,
    /// 503
    ServiceUnavailable,
    /// 500 or an unparseable 5xx
    Internal,
    /// A body that should have been JSON was not
    Decode,
    /// The requested region cannot serve the call
    RegionUnavailable,
    /// The provider disabled the service for this account
    DisabledService,
    /// A request parameter was rejected, by the provider or before dispatch
    ValidationFailed,
    /// The account quota does not allow the operation
    QuotaLimitReached,
    /// A lookup helper matched more than one resource
    MultipleMatches,
    /// A lookup helper matched nothing
    ZeroMatches,
    /// An id was required but empty
    IdEmpty,
    /// Any provider code missing from the known tables
    Unknown,
}

impl ErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; 17] = [
        ErrorKind::Timeout,
        ErrorKind::Unauthorized,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::RateLimited,
        ErrorKind::FailedDependency,
        ErrorKind::ServiceUnavailable,
        ErrorKind::Internal,
        ErrorKind::Decode,
        ErrorKind::RegionUnavailable,
        ErrorKind::DisabledService,
        ErrorKind::ValidationFailed,
        ErrorKind::QuotaLimitReached,
        ErrorKind::MultipleMatches,
        ErrorKind::ZeroMatches,
        ErrorKind::IdEmpty,
        ErrorKind::Unknown,
    ];

    /// Stable name used for identity comparison and rendering
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "Timeout",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::RateLimited => "RateLimited",
            ErrorKind::FailedDependency => "FailedDependency",
            ErrorKind::ServiceUnavailable => "ServiceUnavailable",
            ErrorKind::Internal => "Internal",
            ErrorKind::Decode => "Decode",
            ErrorKind::RegionUnavailable => "RegionUnavailable",
            ErrorKind::DisabledService => "DisabledService",
            ErrorKind::ValidationFailed => "ValidationFailed",
            ErrorKind::QuotaLimitReached => "QuotaLimitReached",
            ErrorKind::MultipleMatches => "MultipleMatches",
            ErrorKind::ZeroMatches => "ZeroMatches",
            ErrorKind::IdEmpty => "IDEmpty",
            ErrorKind::Unknown => "Unknown",
        }
    }

    /// Look a kind up by its stable name
    pub fn from_name(name: &str) -> Option<ErrorKind> {
        ErrorKind::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type: a kind plus the error that caused it
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    inner: Option<BoxError>,
}

impl Error {
    /// Error carrying just a kind
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, inner: None }
    }

    /// Wrap `inner` under `kind`
    pub fn wrap<E>(kind: ErrorKind, inner: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            kind,
            inner: Some(inner.into()),
        }
    }

    /// The outermost kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// True when this error, or any error below it in the chain, has `kind`
    pub fn is(&self, kind: ErrorKind) -> bool {
        if self.kind == kind {
            return true;
        }
        let mut current = self.source();
        while let Some(err) = current {
            if let Some(wrapped) = err.downcast_ref::<Error>() {
                if wrapped.kind == kind {
                    return true;
                }
            }
            current = err.source();
        }
        false
    }

    /// The immediate inner error, if any
    pub fn inner(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.as_deref()
    }

    /// Consume the wrapper and return the immediate inner error
    pub fn into_inner(self) -> Option<BoxError> {
        self.inner
    }

    /// First error of type `T` found walking down from this one
    pub fn find<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<T>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            Some(inner) => write!(f, "{}: {}", self.kind, inner),
            None => f.write_str(self.kind.name()),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .as_deref()
            .map(|inner| inner as &(dyn StdError + 'static))
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::wrap(ErrorKind::Decode, err)
    }
}

/// Why a [`crate::Context`] stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

impl From<ContextError> for Error {
    fn from(err: ContextError) -> Self {
        Error::wrap(ErrorKind::Timeout, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_kind_names_are_unique() {
        let names: HashSet<_> = ErrorKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), ErrorKind::ALL.len());
    }

    #[test]
    fn test_kind_name_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ErrorKind::from_name("NoSuchKind"), None);
    }

    #[test]
    fn test_error_display() {
        let err = Error::wrap(ErrorKind::NotFound, "server abc is gone");
        assert_eq!(err.to_string(), "NotFound: server abc is gone");

        let bare = Error::new(ErrorKind::IdEmpty);
        assert_eq!(bare.to_string(), "IDEmpty");
    }

    #[test]
    fn test_is_walks_nested_wrappers() {
        let inner = Error::wrap(ErrorKind::RateLimited, "slow down");
        let middle = Error::wrap(ErrorKind::Conflict, inner);
        let outer = Error::wrap(ErrorKind::Timeout, middle);

        assert!(outer.is(ErrorKind::Timeout));
        assert!(outer.is(ErrorKind::Conflict));
        assert!(outer.is(ErrorKind::RateLimited));
        assert!(!outer.is(ErrorKind::NotFound));
    }

    #[test]
    fn test_is_through_foreign_error() {
        #[derive(Debug, ThisError)]
        #[error("foreign: {source}")]
        struct Foreign {
            #[source]
            source: Error,
        }

        let err = Error::wrap(
            ErrorKind::Internal,
            Foreign {
                source: Error::new(ErrorKind::QuotaLimitReached),
            },
        );
        assert!(err.is(ErrorKind::QuotaLimitReached));
    }

    #[test]
    fn test_inner_unwraps_one_level() {
        let err = Error::wrap(ErrorKind::Decode, Error::new(ErrorKind::Unknown));
        let inner = err.inner().expect("inner error");
        let inner = inner.downcast_ref::<Error>().expect("nimbus error");
        assert_eq!(inner.kind(), ErrorKind::Unknown);

        assert!(Error::new(ErrorKind::Decode).inner().is_none());
    }

    #[test]
    fn test_find_locates_typed_cause() {
        let err = Error::wrap(
            ErrorKind::Timeout,
            Error::wrap(ErrorKind::Timeout, ContextError::DeadlineExceeded),
        );
        assert_eq!(
            err.find::<ContextError>(),
            Some(&ContextError::DeadlineExceeded)
        );
    }

    #[test]
    fn test_context_error_maps_to_timeout() {
        let err: Error = ContextError::Canceled.into();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "Timeout: context canceled");
    }

    #[test]
    fn test_json_error_maps_to_decode() {
        let json_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }
}
