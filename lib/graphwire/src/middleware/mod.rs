//! Tower middleware layers for the hyper transport.
//!
//! Layers wrap the [`HyperClient`](crate::HyperClient) service, so they see the
//! fully materialized request (URL with GET parameters, headers, JSON body).
//!
//! - [`BearerAuthLayer`] - Adds `Authorization: Bearer <token>` when absent
//! - [`LoggingLayer`] - Logs operations and responses using `tracing`
//!
//! ```ignore
//! use graphwire::HyperClient;
//! use graphwire::middleware::{BearerAuthLayer, ConcurrencyLimitLayer};
//!
//! let client = HyperClient::builder()
//!     .layer(BearerAuthLayer::new("my-token"))
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .with_logging()
//!     .build();
//! ```

mod bearer_auth;
mod logging;

pub use bearer_auth::{BearerAuth, BearerAuthLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::limit::ConcurrencyLimitLayer;
pub use tower::{Layer, ServiceBuilder};
