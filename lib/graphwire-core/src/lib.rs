//! Core types for the graphwire GraphQL request pipeline.
//!
//! This crate provides the transport-agnostic building blocks:
//! - [`GraphQLOperation`] and [`OperationType`] - Typed operation description
//! - [`HttpRequest`] and [`RequestPlan`] - Request descriptor with the method,
//!   body and automatic persisted query decisions
//! - [`HttpResponse`] and [`FetchSource`] - Response state accumulated by the chain
//! - [`GraphQLResult`] and [`GraphQLError`] - Externally visible results
//! - [`Parseable`] and [`FlexibleDecoder`] - Pluggable decoding
//! - [`Request`] and [`Response`] - What the transport consumes and produces
//! - [`HttpClient`] - Transport collaborator trait
//! - [`Error`] and [`Result`] - Error handling

mod body;
mod client;
mod error;
mod http_request;
mod http_response;
mod method;
mod operation;
mod parseable;
pub mod prelude;
mod request;
mod response;
mod result;

pub use body::{ContentType, from_json, from_json_value, to_json, to_query_string};
pub use client::HttpClient;
pub use error::{Error, Result};
pub use http_request::{
    CLIENT_NAME_HEADER, CLIENT_VERSION_HEADER, CachePolicy, Extensions, HttpRequest,
    HttpRequestBuilder, OPERATION_ID_HEADER, OPERATION_NAME_HEADER, OPERATION_TYPE_HEADER,
    PERSISTED_QUERY_VERSION, PersistedQuery, RequestBody, RequestPlan,
};
pub use http_response::{FetchSource, HttpResponse};
pub use method::Method;
pub use operation::{GraphQLOperation, OperationType, sha256_hex};
pub use parseable::{FlexibleDecoder, JsonDecoder, Parseable};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use result::{
    CacheKey, ErrorLocation, GraphQLError, GraphQLResponse, GraphQLResult, PathSegment,
    ResultSource,
};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
