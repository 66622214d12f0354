//! GraphQL request pipeline with interceptor chains and automatic persisted queries.
//!
//! An operation is turned into an [`HttpRequest`] by a
//! [`RequestChainNetworkTransport`], then driven through a [`RequestChain`] of
//! [interceptors](interceptor) built by an [`InterceptorProvider`]:
//!
//! - [`LegacyInterceptorProvider`] - cache-first, untyped JSON parsing, cache write
//! - [`CodableInterceptorProvider`] - direct typed decoding
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use graphwire::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! struct HeroData {
//!     hero: Hero,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Hero {
//!     name: String,
//! }
//!
//! struct HeroQuery;
//!
//! impl GraphQLOperation for HeroQuery {
//!     type Data = HeroData;
//!     type Variables = ();
//!
//!     fn operation_type(&self) -> OperationType {
//!         OperationType::Query
//!     }
//!
//!     fn operation_name(&self) -> &str {
//!         "Hero"
//!     }
//!
//!     fn query_document(&self) -> &str {
//!         "query Hero { hero { name } }"
//!     }
//! }
//!
//! let provider = CodableInterceptorProvider::new(Arc::new(HyperClient::new()));
//! let config = GraphQLConfig::builder().auto_persist_queries(true).build();
//! let transport = RequestChainNetworkTransport::with_config(provider, endpoint, config);
//!
//! if let Some(result) = transport.fetch(HeroQuery).await {
//!     let hero = result?.data;
//! }
//! ```

mod cache;
mod chain;
mod client;
mod config;
pub mod interceptor;
pub mod middleware;
pub mod prelude;
mod provider;
mod transport;

pub use cache::{CacheRecord, CacheStore, InMemoryStore};
pub use chain::RequestChain;
pub use client::{BoxedService, HyperClient, HyperClientBuilder, ServiceFuture};
pub use config::{ClientConfig, ClientConfigBuilder, GraphQLConfig, GraphQLConfigBuilder};
pub use provider::{
    CodableInterceptorProvider, InterceptorProvider, Interceptors, LegacyInterceptorProvider,
};
pub use transport::{CancelHandle, Execution, RequestChainNetworkTransport};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use graphwire_core::{
    CLIENT_NAME_HEADER, CLIENT_VERSION_HEADER, CacheKey, CachePolicy, ContentType, Error,
    ErrorLocation, Extensions, FetchSource, FlexibleDecoder, GraphQLError, GraphQLOperation,
    GraphQLResponse, GraphQLResult, HttpClient, HttpRequest, HttpRequestBuilder, HttpResponse,
    JsonDecoder, Method, OPERATION_ID_HEADER, OPERATION_NAME_HEADER, OPERATION_TYPE_HEADER,
    OperationType, PERSISTED_QUERY_VERSION, Parseable, PathSegment, PersistedQuery, Request,
    RequestBody, RequestBuilder, RequestPlan, Response, Result, ResultSource, from_json,
    from_json_value, sha256_hex, to_json, to_query_string,
};

// Re-export http types for status codes and headers
pub use graphwire_core::{StatusCode, header};

pub use url;
