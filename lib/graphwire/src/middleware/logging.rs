//! Operation logging middleware.
//!
//! Logs every request with the GraphQL operation it carries, read from the
//! `X-APOLLO-OPERATION-*` headers, and the outcome of the exchange.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use graphwire_core::{OPERATION_NAME_HEADER, OPERATION_TYPE_HEADER};
use tower::{Layer, Service, ServiceExt};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that adds operation logging.
///
/// ```ignore
/// use graphwire::middleware::LoggingLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(LoggingLayer::new())
///     .service(client);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Log level for the logging middleware.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogLevel {
    /// Log at debug level, with headers.
    Debug,
    /// Log at info level, summary only.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a logging layer at info level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer at debug level.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs operations and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Create a logging service wrapping the given service.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            level: LogLevel::Info,
        }
    }
}

fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> &'a str {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map_or("-", |(_, value)| value.as_str())
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let operation = find_header(request.headers(), OPERATION_NAME_HEADER).to_string();
        let operation_type = find_header(request.headers(), OPERATION_TYPE_HEADER).to_string();
        let level = self.level;

        let span = span!(Level::INFO, "graphql_request", %method, %operation, %operation_type);

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();

                match level {
                    LogLevel::Debug => {
                        debug!(
                            url = %request.url(),
                            headers = ?request.headers(),
                            body_len = request.body().map_or(0, Bytes::len),
                            "sending operation"
                        );
                    }
                    LogLevel::Info => info!("sending operation"),
                }

                let result = match inner.ready().await {
                    Ok(ready) => ready.call(request).await,
                    Err(err) => Err(err),
                };
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match &result {
                    Ok(response) if response.is_success() => {
                        info!(status = response.status(), elapsed_ms, "operation completed");
                    }
                    Ok(response) => {
                        let status = response.status();
                        warn!(status, elapsed_ms, "operation failed with HTTP error");
                    }
                    Err(err) => warn!(error = %err, elapsed_ms, "operation failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}
