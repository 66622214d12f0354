//! Error types for graphwire.

use bytes::Bytes;
use derive_more::{Display, Error, From};

use crate::{FetchSource, Response};

/// Main error type for graphwire operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    // ------------------------------------------------------------------------
    // Build-time errors (the attempt never reaches the network)
    // ------------------------------------------------------------------------
    /// The request body could not be turned into GET query parameters.
    #[display("failed to serialize GET query parameters: {_0}")]
    #[from(skip)]
    QueryParamsSerialization(#[error(not(source))] String),

    /// The request body could not be serialized for a POST request.
    #[display("failed to serialize request body: {_0}")]
    #[from(skip)]
    BodySerialization(serde_json::Error),

    // ------------------------------------------------------------------------
    // Transport errors
    // ------------------------------------------------------------------------
    /// HTTP-level errors (non-2xx status codes).
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    // ------------------------------------------------------------------------
    // Decoding errors
    // ------------------------------------------------------------------------
    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "data.hero.name").
        path: String,
        /// Error message.
        message: String,
    },

    /// The payload did not have the expected shape.
    #[display("unexpected payload type: {_0}")]
    #[from(skip)]
    UnexpectedType(#[error(not(source))] String),

    /// The type cannot be built from raw bytes.
    #[display("type does not support decoding from raw bytes")]
    #[from(skip)]
    UnsupportedInitializer,

    /// The chain reached its final stage without a parsed value.
    #[display("no parsed value available at finalization (served from {fetch_source})")]
    #[from(skip)]
    NilParsedValue {
        /// Transport response head (status and headers), untouched.
        #[error(not(source))]
        http_response: Option<Response<()>>,
        /// Raw response bytes, untouched.
        #[error(not(source))]
        raw_data: Option<Bytes>,
        /// Where the response came from.
        #[error(not(source))]
        fetch_source: FetchSource,
    },

    // ------------------------------------------------------------------------
    // Cache & chain
    // ------------------------------------------------------------------------
    /// No cached data for a policy that forbids fetching.
    #[display("no cached data for key '{key}'")]
    #[from(skip)]
    CacheMiss {
        /// The cache key that was looked up.
        key: String,
    },

    /// Cache store failure.
    #[display("cache error: {_0}")]
    #[from(skip)]
    Cache(#[error(not(source))] String),

    /// Every stage let the request through and nothing produced a result.
    #[display("request chain finished without a result")]
    #[from(skip)]
    ChainExhausted,
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a GET query parameters serialization error.
    #[must_use]
    pub fn query_params(message: impl Into<String>) -> Self {
        Self::QueryParamsSerialization(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a cache store error.
    #[must_use]
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if the request could not be built (GET or POST encoding).
    #[must_use]
    pub const fn is_build_error(&self) -> bool {
        matches!(
            self,
            Self::QueryParamsSerialization(_) | Self::BodySerialization(_)
        )
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Raw bytes attached to the error: the HTTP error body, or the raw data
    /// of a [`Error::NilParsedValue`].
    #[must_use]
    pub fn raw_data(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            Self::NilParsedValue { raw_data, .. } => raw_data.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Returns `None` if there is no body or this is not an HTTP error.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
