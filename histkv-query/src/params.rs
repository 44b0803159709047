//! Path parameter extraction and validation
//!
//! Numeric parameters are parsed before any store call. The first invalid
//! parameter wins, so callers must request them in route order
//! (`timestamp`, or `start` then `end` then `interval`).

use std::collections::HashMap;
use std::num::ParseIntError;
use thiserror::Error;

/// Rejections produced before the store is consulted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// Segment is not a base-10 signed 64-bit integer. The message carries
    /// the offending text and the parser's own description.
    #[error("invalid {name}: parsing {raw:?}: {source}")]
    InvalidInteger {
        name: &'static str,
        raw: String,
        source: ParseIntError,
    },

    #[error("missing path parameter '{0}'")]
    Missing(&'static str),

    /// The router could not decode the path at all (e.g. bad percent-encoding)
    #[error("invalid path: {0}")]
    Malformed(String),
}

/// Parse one numeric path segment
pub fn parse_i64(name: &'static str, raw: &str) -> Result<i64, ParamError> {
    raw.parse::<i64>()
        .map_err(|source| ParamError::InvalidInteger {
            name,
            raw: raw.to_string(),
            source,
        })
}

/// Decoded path parameters of one request, by name
#[derive(Debug, Clone, Default)]
pub struct PathParams(HashMap<String, String>);

impl PathParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self(params)
    }

    /// The key segment, used verbatim
    pub fn key(&self) -> Result<&str, ParamError> {
        self.raw("key")
    }

    /// A numeric segment, parsed as `i64`
    pub fn integer(&self, name: &'static str) -> Result<i64, ParamError> {
        parse_i64(name, self.raw(name)?)
    }

    fn raw(&self, name: &'static str) -> Result<&str, ParamError> {
        self.0
            .get(name)
            .map(String::as_str)
            .ok_or(ParamError::Missing(name))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
