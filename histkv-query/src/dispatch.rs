//! Validated read requests and their execution against a store

use histkv_core::{StoreResult, Timestamp, VersionedStore};
use std::fmt;

use crate::params::{ParamError, PathParams};
use crate::response::{Payload, SeriesFormat};

/// Store operation a route resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    GetAt,
    Range,
    From,
    RangeInterval,
    FromInterval,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "Get",
            Operation::GetAt => "GetAt",
            Operation::Range => "Range",
            Operation::From => "From",
            Operation::RangeInterval => "RangeInterval",
            Operation::FromInterval => "FromInterval",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A read request whose parameters have all been validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadQuery {
    Get {
        key: String,
    },
    GetAt {
        key: String,
        timestamp: Timestamp,
    },
    Range {
        key: String,
        start: Timestamp,
        end: Timestamp,
    },
    From {
        key: String,
        start: Timestamp,
    },
    RangeInterval {
        key: String,
        start: Timestamp,
        end: Timestamp,
        interval: i64,
    },
    FromInterval {
        key: String,
        start: Timestamp,
        interval: i64,
    },
}

impl ReadQuery {
    /// Validate the parameters `operation` needs, in order
    /// (`start`, then `end`, then `interval`), stopping at the first bad one.
    pub fn parse(operation: Operation, params: &PathParams) -> Result<Self, ParamError> {
        let key = params.key()?.to_string();

        let query = match operation {
            Operation::Get => ReadQuery::Get { key },
            Operation::GetAt => ReadQuery::GetAt {
                key,
                timestamp: params.integer("timestamp")?,
            },
            Operation::Range => {
                let start = params.integer("start")?;
                let end = params.integer("end")?;
                ReadQuery::Range { key, start, end }
            }
            Operation::From => ReadQuery::From {
                key,
                start: params.integer("start")?,
            },
            Operation::RangeInterval => {
                let start = params.integer("start")?;
                let end = params.integer("end")?;
                let interval = params.integer("interval")?;
                ReadQuery::RangeInterval {
                    key,
                    start,
                    end,
                    interval,
                }
            }
            Operation::FromInterval => {
                let start = params.integer("start")?;
                let interval = params.integer("interval")?;
                ReadQuery::FromInterval {
                    key,
                    start,
                    interval,
                }
            }
        };

        Ok(query)
    }

    pub fn operation(&self) -> Operation {
        match self {
            ReadQuery::Get { .. } => Operation::Get,
            ReadQuery::GetAt { .. } => Operation::GetAt,
            ReadQuery::Range { .. } => Operation::Range,
            ReadQuery::From { .. } => Operation::From,
            ReadQuery::RangeInterval { .. } => Operation::RangeInterval,
            ReadQuery::FromInterval { .. } => Operation::FromInterval,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ReadQuery::Get { key }
            | ReadQuery::GetAt { key, .. }
            | ReadQuery::Range { key, .. }
            | ReadQuery::From { key, .. }
            | ReadQuery::RangeInterval { key, .. }
            | ReadQuery::FromInterval { key, .. } => key,
        }
    }

    /// Issue exactly one store call. No retries, no caching.
    pub async fn execute(
        &self,
        store: &dyn VersionedStore,
        format: SeriesFormat,
    ) -> StoreResult<Payload> {
        let payload = match self {
            ReadQuery::Get { key } => Payload::Value(store.get(key).await?),
            ReadQuery::GetAt { key, timestamp } => {
                Payload::Value(store.get_at(key, *timestamp).await?)
            }
            ReadQuery::Range { key, start, end } => {
                Payload::series(store.range(key, *start, *end).await?, format)
            }
            ReadQuery::From { key, start } => {
                Payload::series(store.from(key, *start).await?, format)
            }
            ReadQuery::RangeInterval {
                key,
                start,
                end,
                interval,
            } => Payload::series(
                store.range_interval(key, *start, *end, *interval).await?,
                format,
            ),
            ReadQuery::FromInterval {
                key,
                start,
                interval,
            } => Payload::series(store.from_interval(key, *start, *interval).await?, format),
        };

        Ok(payload)
    }
}
