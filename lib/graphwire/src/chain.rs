//! Chain driver.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use graphwire_core::{Error, GraphQLOperation, HttpRequest, HttpResponse, Result};
use tracing::{Instrument, Level, debug, span, warn};

use crate::interceptor::{BoxedInterceptor, Cancellation, ChainContext, Flow};

/// Runs an ordered list of stages over a request.
///
/// A chain belongs to one execution: it may be kicked off several times (the
/// persisted query retry reuses it) and cancelled once, for good.
pub struct RequestChain<O: GraphQLOperation, P> {
    interceptors: Vec<BoxedInterceptor<O, P>>,
    cancellation: Arc<Cancellation>,
    attempts: AtomicU32,
}

impl<O: GraphQLOperation, P> std::fmt::Debug for RequestChain<O, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestChain")
            .field("interceptors", &self.names())
            .field("cancelled", &self.is_cancelled())
            .field("attempts", &self.attempts())
            .finish()
    }
}

impl<O: GraphQLOperation, P> RequestChain<O, P> {
    /// Creates a chain over the given stages.
    #[must_use]
    pub fn new(interceptors: Vec<BoxedInterceptor<O, P>>) -> Self {
        Self {
            interceptors,
            cancellation: Arc::new(Cancellation::new()),
            attempts: AtomicU32::new(0),
        }
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain has no stage.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Stage names, in order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|stage| stage.name()).collect()
    }

    /// Number of times the chain was kicked off.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Cancel the chain and every stage. Cannot be undone.
    pub fn cancel(&self) {
        self.cancellation.cancel();
        for stage in &self.interceptors {
            stage.cancel();
        }
    }

    /// Whether the chain was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Run the stages in order over `request`.
    ///
    /// Returns the completion of the first stage that completes, `None` when the
    /// chain or the completing stage was cancelled, and
    /// [`Error::ChainExhausted`] when every stage proceeded.
    pub async fn kickoff(&self, mut request: HttpRequest<O>) -> Option<Result<P>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let span = span!(
            Level::INFO,
            "graphql_operation",
            operation = request.operation().operation_name(),
            operation_type = %request.operation().operation_type(),
            attempt,
        );

        self.run(attempt, &mut request).instrument(span).await
    }

    async fn run(&self, attempt: u32, request: &mut HttpRequest<O>) -> Option<Result<P>> {
        let context = ChainContext::new(attempt, Arc::clone(&self.cancellation));
        let mut response = HttpResponse::new();

        for stage in &self.interceptors {
            if self.is_cancelled() {
                debug!(stage = stage.name(), "chain cancelled, stopping");
                return None;
            }

            debug!(stage = stage.name(), "entering stage");
            match stage.intercept(&context, request, &mut response).await {
                Flow::Proceed => {}
                Flow::Complete(_) if stage.is_cancelled() || self.is_cancelled() => {
                    debug!(stage = stage.name(), "dropping completion of a cancelled stage");
                    return None;
                }
                Flow::Complete(result) => {
                    debug!(stage = stage.name(), success = result.is_ok(), "attempt completed");
                    return Some(result);
                }
                Flow::Cancelled => {
                    debug!(stage = stage.name(), "stage cancelled");
                    return None;
                }
            }
        }

        if self.is_cancelled() {
            return None;
        }
        warn!(stages = self.len(), "no stage completed the attempt");
        Some(Err(Error::ChainExhausted))
    }
}
