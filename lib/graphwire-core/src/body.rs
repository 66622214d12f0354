//! Body serialization utilities.

use bytes::Bytes;

use crate::{Error, Result};

/// Content type for GraphQL request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    #[default]
    Json,
    /// GraphQL response media type (`application/graphql-response+json`).
    GraphQLResponseJson,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::GraphQLResponseJson => "application/graphql-response+json",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes for a POST body.
///
/// # Errors
///
/// Returns [`Error::BodySerialization`] if JSON serialization fails.
///
/// # Example
///
/// ```
/// use graphwire_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Vars { episode: String }
///
/// let vars = Vars { episode: "JEDI".to_string() };
/// let bytes = to_json(&vars).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"episode":"JEDI"}"#);
/// ```
pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Error::BodySerialization)
}

/// Serialize a value to a query string.
///
/// # Errors
///
/// Returns [`Error::QueryParamsSerialization`] if the value cannot be encoded.
///
/// # Example
///
/// ```
/// use graphwire_core::to_query_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Params {
///     operation_name: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     variables: Option<String>,
/// }
///
/// let params = Params { operation_name: "Hero".to_string(), variables: None };
/// let query = to_query_string(&params).expect("serialize");
/// assert_eq!(query, "operationName=Hero");
/// ```
pub fn to_query_string<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_html_form::to_string(value).map_err(|e| Error::query_params(e.to_string()))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error message includes the exact path to
/// the field that failed to deserialize.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] if JSON deserialization fails.
///
/// # Example
///
/// ```
/// use graphwire_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct Hero { name: String }
///
/// let hero: Hero = from_json(br#"{"name":"R2-D2"}"#).expect("deserialize");
/// assert_eq!(hero, Hero { name: "R2-D2".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}

/// Convert a JSON value into a typed value with path-aware error messages.
///
/// # Errors
///
/// Returns [`Error::JsonDeserialization`] if the value does not match `T`.
pub fn from_json_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}
