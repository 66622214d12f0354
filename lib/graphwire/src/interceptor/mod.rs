//! Interceptors: the stages of a request chain.
//!
//! An [`Interceptor`] performs one unit of work on the in-flight request and
//! response state, then tells the chain driver what to do next with a [`Flow`]:
//!
//! - [`Flow::Proceed`] - nothing to report, run the next stage
//! - [`Flow::Complete`] - the single completion of this attempt (success or error)
//! - [`Flow::Cancelled`] - the stage was cancelled, drop everything
//!
//! Each stage instance carries a [`Cancellation`] flag. Once set, every call to
//! [`Interceptor::intercept`] is a no-op returning [`Flow::Cancelled`].
//!
//! # Standard stages
//!
//! - [`LegacyCacheReadInterceptor`] - serves queries from a [`crate::CacheStore`]
//! - [`NetworkFetchInterceptor`] - sends the request through an [`crate::HttpClient`]
//! - [`ResponseCodeInterceptor`] - rejects non-2xx responses
//! - [`LegacyParsingInterceptor`] - untyped JSON decoding, dependent keys, cache write
//! - [`CodableParsingInterceptor`] - typed decoding through a [`crate::FlexibleDecoder`]
//! - [`FinalizingInterceptor`] - turns the parsed value into the final result

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use graphwire_core::{GraphQLOperation, HttpRequest, HttpResponse, Result};

mod cache_read;
mod codable_parsing;
mod finalizing;
mod legacy_parsing;
mod network_fetch;
mod response_code;

pub use cache_read::LegacyCacheReadInterceptor;
pub use codable_parsing::CodableParsingInterceptor;
pub use finalizing::FinalizingInterceptor;
pub use legacy_parsing::LegacyParsingInterceptor;
pub use network_fetch::NetworkFetchInterceptor;
pub use response_code::ResponseCodeInterceptor;

/// What the chain driver should do after a stage ran.
#[derive(Debug)]
pub enum Flow<P> {
    /// Run the next stage.
    Proceed,
    /// Terminal result for this attempt.
    Complete(Result<P>),
    /// The stage is cancelled; no result must be propagated.
    Cancelled,
}

impl<P> Flow<P> {
    /// Returns `true` for [`Flow::Complete`].
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Future returned by [`Interceptor::intercept`].
pub type InterceptorFuture<'a, P> = Pin<Box<dyn Future<Output = Flow<P>> + Send + 'a>>;

/// Boxed interceptor, as returned by providers.
pub type BoxedInterceptor<O, P> = Box<dyn Interceptor<O, P>>;

/// One-shot, monotonic cancellation flag.
#[derive(Debug, Default)]
pub struct Cancellation {
    cancelled: AtomicBool,
}

impl Cancellation {
    /// Creates a flag that is not cancelled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Set the flag. Cannot be undone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the flag is set.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-attempt information handed to every stage by the chain driver.
#[derive(Debug, Clone)]
pub struct ChainContext {
    attempt: u32,
    cancellation: Arc<Cancellation>,
}

impl ChainContext {
    /// Creates a context for the given attempt (1-based).
    #[must_use]
    pub fn new(attempt: u32, cancellation: Arc<Cancellation>) -> Self {
        Self {
            attempt,
            cancellation,
        }
    }

    /// Attempt number within the execution, starting at 1.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Whether the whole execution was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// A stage of the request chain.
///
/// Implementations may mutate the request headers and populate the response,
/// and must return [`Flow::Cancelled`] without touching either once cancelled.
pub trait Interceptor<O: GraphQLOperation, P>: Send + Sync {
    /// Stage name, used in logs.
    fn name(&self) -> &'static str;

    /// The stage's cancellation flag.
    fn cancellation(&self) -> &Cancellation;

    /// Cancel this stage instance.
    fn cancel(&self) {
        self.cancellation().cancel();
    }

    /// Whether this stage instance was cancelled.
    fn is_cancelled(&self) -> bool {
        self.cancellation().is_cancelled()
    }

    /// Process the request/response pair.
    fn intercept<'a>(
        &'a self,
        chain: &'a ChainContext,
        request: &'a mut HttpRequest<O>,
        response: &'a mut HttpResponse<P>,
    ) -> InterceptorFuture<'a, P>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_is_monotonic() {
        let cancellation = Cancellation::new();
        assert!(!cancellation.is_cancelled());

        cancellation.cancel();
        cancellation.cancel();
        assert!(cancellation.is_cancelled());
    }

    #[test]
    fn context_reflects_execution_cancellation() {
        let cancellation = Arc::new(Cancellation::new());
        let context = ChainContext::new(2, Arc::clone(&cancellation));
        assert_eq!(context.attempt(), 2);
        assert!(!context.is_cancelled());

        cancellation.cancel();
        assert!(context.is_cancelled());
    }
}
