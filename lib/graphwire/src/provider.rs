//! Pipeline assemblers.
//!
//! An [`InterceptorProvider`] builds the ordered stage list for one operation.
//! Stages carry per-execution state (their cancellation flag), so every call
//! returns fresh instances.

use std::sync::Arc;

use graphwire_core::{FlexibleDecoder, GraphQLOperation, GraphQLResult, HttpClient, JsonDecoder};

use crate::cache::CacheStore;
use crate::interceptor::{
    BoxedInterceptor, CodableParsingInterceptor, FinalizingInterceptor,
    LegacyCacheReadInterceptor, LegacyParsingInterceptor, NetworkFetchInterceptor,
    ResponseCodeInterceptor,
};

/// Stage list for an operation, as produced by a provider.
pub type Interceptors<O> =
    Vec<BoxedInterceptor<O, GraphQLResult<<O as GraphQLOperation>::Data>>>;

/// Builds the stages of a request chain.
pub trait InterceptorProvider: Send + Sync {
    /// Ordered stages for `operation`, freshly created.
    fn interceptors<O: GraphQLOperation>(&self, operation: &O) -> Interceptors<O>;
}

/// Cache-first pipeline with untyped JSON parsing.
///
/// Stages: cache read, network fetch, response code, legacy parsing, finalizing.
#[derive(Debug)]
pub struct LegacyInterceptorProvider<C, S> {
    client: Arc<C>,
    store: Arc<S>,
}

impl<C, S> LegacyInterceptorProvider<C, S> {
    /// Creates a provider over the given transport and store.
    #[must_use]
    pub const fn new(client: Arc<C>, store: Arc<S>) -> Self {
        Self { client, store }
    }

    /// The shared cache store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }
}

impl<C, S> Clone for LegacyInterceptorProvider<C, S> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            store: Arc::clone(&self.store),
        }
    }
}

impl<C, S> InterceptorProvider for LegacyInterceptorProvider<C, S>
where
    C: HttpClient + 'static,
    S: CacheStore,
{
    fn interceptors<O: GraphQLOperation>(&self, _operation: &O) -> Interceptors<O> {
        vec![
            Box::new(LegacyCacheReadInterceptor::new(Arc::clone(&self.store))),
            Box::new(NetworkFetchInterceptor::new(Arc::clone(&self.client))),
            Box::new(ResponseCodeInterceptor::new()),
            Box::new(LegacyParsingInterceptor::new(Arc::clone(&self.store))),
            Box::new(FinalizingInterceptor::new()),
        ]
    }
}

/// Pipeline decoding straight into the operation's data type.
///
/// Stages: network fetch, response code, codable parsing, finalizing.
#[derive(Debug)]
pub struct CodableInterceptorProvider<C, D = JsonDecoder> {
    client: Arc<C>,
    decoder: Arc<D>,
}

impl<C> CodableInterceptorProvider<C> {
    /// Creates a provider decoding JSON.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self::with_decoder(client, Arc::new(JsonDecoder))
    }
}

impl<C, D> CodableInterceptorProvider<C, D> {
    /// Creates a provider with a custom decoder.
    #[must_use]
    pub const fn with_decoder(client: Arc<C>, decoder: Arc<D>) -> Self {
        Self { client, decoder }
    }
}

impl<C, D> Clone for CodableInterceptorProvider<C, D> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            decoder: Arc::clone(&self.decoder),
        }
    }
}

impl<C, D> InterceptorProvider for CodableInterceptorProvider<C, D>
where
    C: HttpClient + 'static,
    D: FlexibleDecoder + 'static,
{
    fn interceptors<O: GraphQLOperation>(&self, _operation: &O) -> Interceptors<O> {
        vec![
            Box::new(NetworkFetchInterceptor::new(Arc::clone(&self.client))),
            Box::new(ResponseCodeInterceptor::new()),
            Box::new(CodableParsingInterceptor::new(Arc::clone(&self.decoder))),
            Box::new(FinalizingInterceptor::new()),
        ]
    }
}
