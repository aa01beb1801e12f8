//! Find a resource by id or name
//!
//! An exact id or name match wins. Otherwise a single partial match on the
//! name or id is accepted; several partial matches are ambiguous.

use nimbus_core::{Error, ErrorKind, Result};

/// Why a lookup did not produce exactly one resource
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unable to find {search} because there were multiple matches")]
    MultipleMatches { search: String },

    #[error("unable to find {search}, zero matches")]
    ZeroMatches { search: String },
}

impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        let kind = match err {
            LookupError::MultipleMatches { .. } => ErrorKind::MultipleMatches,
            LookupError::ZeroMatches { .. } => ErrorKind::ZeroMatches,
        };
        Error::wrap(kind, err)
    }
}

/// Pick the one item of `items` that `search` designates
///
/// `case_insensitive` applies to name comparisons only; ids always compare
/// exactly.
pub fn find_by_id_or_name<'a, T, I, N>(
    items: &'a [T],
    search: &str,
    id_of: I,
    name_of: N,
    case_insensitive: bool,
) -> Result<&'a T>
where
    I: Fn(&T) -> &str,
    N: Fn(&T) -> &str,
{
    if search.is_empty() {
        return Err(Error::wrap(ErrorKind::IdEmpty, "search term is empty"));
    }

    let needle = if case_insensitive {
        search.to_lowercase()
    } else {
        search.to_string()
    };
    let normalise = |name: &str| {
        if case_insensitive {
            name.to_lowercase()
        } else {
            name.to_string()
        }
    };

    if let Some(exact) = items
        .iter()
        .find(|item| id_of(*item) == search || normalise(name_of(*item)) == needle)
    {
        return Ok(exact);
    }

    let mut partial = items
        .iter()
        .filter(|item| {
            id_of(*item).contains(search) || normalise(name_of(*item)).contains(&needle)
        });

    match (partial.next(), partial.next()) {
        (Some(found), None) => Ok(found),
        (Some(_), Some(_)) => Err(LookupError::MultipleMatches {
            search: search.to_string(),
        }
        .into()),
        (None, _) => Err(LookupError::ZeroMatches {
            search: search.to_string(),
        }
        .into()),
    }
}
