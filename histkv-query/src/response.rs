//! Response envelope and rendering
//!
//! Every response body is exactly one of `{"Data": <payload>}` (2xx) or
//! `{"Error": "<message>"}` (4xx/5xx), and is always well-formed JSON.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::error;

use histkv_core::{Series, Timestamp};

use crate::error::GatewayError;

/// Body used when even the error envelope cannot be encoded
pub const FALLBACK_ERROR_BODY: &str = r#"{"Error":"failed to encode response"}"#;

const CONTENT_TYPE_JSON: &str = "application/json";

/// The JSON wrapper around every response
#[derive(Debug, Serialize)]
pub enum Envelope<T> {
    Data(T),
    Error(String),
}

/// How series results are laid out in `Data`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesFormat {
    /// `[{"d": value, "t": timestamp}, ...]` in ascending order
    #[default]
    Array,
    /// Legacy `{"<timestamp>": value, ...}`
    Map,
}

impl FromStr for SeriesFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" => Ok(SeriesFormat::Array),
            "map" => Ok(SeriesFormat::Map),
            other => Err(anyhow::anyhow!("unknown series format '{}'", other)),
        }
    }
}

impl fmt::Display for SeriesFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesFormat::Array => f.write_str("array"),
            SeriesFormat::Map => f.write_str("map"),
        }
    }
}

/// Successful result of a read, ready to be placed in `Data`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Value(Value),
    Series(Series),
    Map(BTreeMap<Timestamp, Value>),
}

impl Payload {
    /// Shape a series according to the configured format
    pub fn series(series: Series, format: SeriesFormat) -> Self {
        match format {
            SeriesFormat::Array => Payload::Series(series),
            SeriesFormat::Map => Payload::Map(series.to_map()),
        }
    }

    /// Number of versions carried
    pub fn len(&self) -> usize {
        match self {
            Payload::Value(_) => 1,
            Payload::Series(series) => series.len(),
            Payload::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Turns a value into a JSON string.
///
/// The renderer only talks to this seam so the failure paths can be driven
/// without constructing values serde cannot handle.
pub trait Encoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error>;
}

/// Compact `serde_json` encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl Encoder for JsonEncoder {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error> {
        serde_json::to_string(value)
    }
}

/// A fully rendered response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub status: StatusCode,
    pub body: String,
}

impl Rendered {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, CONTENT_TYPE_JSON)],
            self.body,
        )
            .into_response()
    }
}

/// Render a read result with the default JSON encoder.
///
/// Pure: the same input always yields the same status and body.
pub fn render<T: Serialize>(result: Result<T, GatewayError>) -> Rendered {
    render_with(&JsonEncoder, result)
}

/// Render a read result.
///
/// - `Ok` becomes `{"Data": ..}` with 200
/// - `Err` becomes `{"Error": ..}` with the error's status
/// - if that cannot be encoded, an error envelope describing the encoding
///   failure is sent with 500
/// - if that fails too, [`FALLBACK_ERROR_BODY`] is sent with 500
pub fn render_with<E: Encoder, T: Serialize>(
    encoder: &E,
    result: Result<T, GatewayError>,
) -> Rendered {
    let (status, encoded) = match result {
        Ok(data) => (StatusCode::OK, encoder.encode(&Envelope::Data(data))),
        Err(err) => (
            err.status(),
            encoder.encode(&Envelope::<()>::Error(err.to_string())),
        ),
    };

    let err = match encoded {
        Ok(body) => return Rendered { status, body },
        Err(err) => err,
    };

    error!("Failed to encode response: {}", err);
    let message = format!("failed to encode response: {}", err);
    match encoder.encode(&Envelope::<()>::Error(message)) {
        Ok(body) => Rendered {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body,
        },
        Err(err) => {
            error!("Failed to encode error response: {}", err);
            Rendered {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: FALLBACK_ERROR_BODY.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::parse_i64;
    use histkv_core::{StoreError, Version};
    use serde::ser::Error as _;
    use serde_json::json;

    /// Value serde refuses to encode
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("value is not representable"))
        }
    }

    /// Encoder that always fails
    struct BrokenEncoder;

    impl Encoder for BrokenEncoder {
        fn encode<T: Serialize + ?Sized>(&self, _value: &T) -> Result<String, serde_json::Error> {
            Err(serde_json::Error::custom("encoder offline"))
        }
    }

    #[test]
    fn test_renders_data_envelope() {
        let rendered = render::<Payload>(Ok(Payload::Value(json!("value"))));
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.body, r#"{"Data":"value"}"#);
        assert!(rendered.is_success());
    }

    #[test]
    fn test_renders_series_as_array() {
        let series: Series = vec![Version::new(123, "value")].into_iter().collect();
        let rendered = render::<Payload>(Ok(Payload::series(series, SeriesFormat::Array)));
        assert_eq!(rendered.body, r#"{"Data":[{"d":"value","t":123}]}"#);
    }

    #[test]
    fn test_renders_series_as_legacy_map() {
        let series: Series = vec![Version::new(123, "value"), Version::new(7, 1)]
            .into_iter()
            .collect();
        let rendered = render::<Payload>(Ok(Payload::series(series, SeriesFormat::Map)));
        assert_eq!(rendered.body, r#"{"Data":{"7":1,"123":"value"}}"#);
    }

    #[test]
    fn test_renders_empty_series() {
        let rendered = render::<Payload>(Ok(Payload::series(Series::new(), SeriesFormat::Array)));
        assert_eq!(rendered.status, StatusCode::OK);
        assert_eq!(rendered.body, r#"{"Data":[]}"#);
    }

    #[test]
    fn test_renders_parameter_error_as_bad_request() {
        let err = parse_i64("timestamp", "abc").unwrap_err();
        let rendered = render::<Payload>(Err(err.into()));
        assert_eq!(rendered.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            rendered.body,
            r#"{"Error":"invalid timestamp: parsing \"abc\": invalid digit found in string"}"#
        );
    }

    #[test]
    fn test_renders_store_error_as_not_found() {
        let rendered = render::<Payload>(Err(StoreError::backend("so sorry").into()));
        assert_eq!(rendered.status, StatusCode::NOT_FOUND);
        assert_eq!(rendered.body, r#"{"Error":"so sorry"}"#);
    }

    #[test]
    fn test_unencodable_data_degrades_to_internal_error() {
        let rendered = render(Ok(Unencodable));
        assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);

        let body: Value = serde_json::from_str(&rendered.body).unwrap();
        let message = body["Error"].as_str().unwrap();
        assert!(message.starts_with("failed to encode response"));
        assert!(message.contains("value is not representable"));
        assert!(body.get("Data").is_none());
    }

    #[test]
    fn test_broken_encoder_falls_back_to_fixed_body() {
        for rendered in [
            render_with(&BrokenEncoder, Ok(json!(1))),
            render_with::<_, Value>(&BrokenEncoder, Err(StoreError::backend("x").into())),
        ] {
            assert_eq!(rendered.status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(rendered.body, FALLBACK_ERROR_BODY);
            let body: Value = serde_json::from_str(&rendered.body).unwrap();
            assert!(body["Error"].is_string());
        }
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let series: Series = (0..50).map(|t| Version::new(t, json!({"n": t}))).collect();
        let first = render::<Payload>(Ok(Payload::series(series.clone(), SeriesFormat::Array)));
        let second = render::<Payload>(Ok(Payload::series(series, SeriesFormat::Array)));
        assert_eq!(first, second);
    }

    #[test]
    fn test_series_format_parsing() {
        assert_eq!("array".parse::<SeriesFormat>().unwrap(), SeriesFormat::Array);
        assert_eq!("Map".parse::<SeriesFormat>().unwrap(), SeriesFormat::Map);
        assert!("csv".parse::<SeriesFormat>().is_err());
        assert_eq!(SeriesFormat::default().to_string(), "array");
    }
}
