//! Network transport front-end.
//!
//! [`RequestChainNetworkTransport`] turns an operation into an [`HttpRequest`],
//! asks its [`InterceptorProvider`] for the stages and hands back an
//! [`Execution`]. Running the execution drives the [`RequestChain`] and, when
//! the server does not know a persisted query, retries once with the document.

use std::sync::Arc;

use graphwire_core::{CachePolicy, GraphQLOperation, GraphQLResult, HttpRequest, Result};
use tracing::{debug, info};
use url::Url;

use crate::chain::RequestChain;
use crate::config::GraphQLConfig;
use crate::provider::InterceptorProvider;

/// Sends operations through request chains built by a provider.
#[derive(Debug)]
pub struct RequestChainNetworkTransport<P> {
    provider: Arc<P>,
    endpoint: Url,
    config: GraphQLConfig,
}

impl<P> Clone for RequestChainNetworkTransport<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            endpoint: self.endpoint.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: InterceptorProvider> RequestChainNetworkTransport<P> {
    /// Creates a transport with the default [`GraphQLConfig`].
    #[must_use]
    pub fn new(provider: P, endpoint: Url) -> Self {
        Self::with_config(provider, endpoint, GraphQLConfig::default())
    }

    /// Creates a transport with the given configuration.
    #[must_use]
    pub fn with_config(provider: P, endpoint: Url, config: GraphQLConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            endpoint,
            config,
        }
    }

    /// GraphQL endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Request policy.
    #[must_use]
    pub const fn config(&self) -> &GraphQLConfig {
        &self.config
    }

    /// The provider building the chains.
    #[must_use]
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Build the request descriptor for `operation` with this transport's policy.
    #[must_use]
    pub fn construct_request<O: GraphQLOperation>(
        &self,
        operation: O,
        cache_policy: CachePolicy,
    ) -> HttpRequest<O> {
        let mut builder = HttpRequest::builder(operation, self.endpoint.clone())
            .cache_policy(cache_policy)
            .auto_persist_queries(self.config.auto_persist_queries)
            .use_get_for_queries(self.config.use_get_for_queries)
            .use_get_for_persisted_query_retry(self.config.use_get_for_persisted_query_retry)
            .headers(self.config.additional_headers.clone());
        if let Some(name) = &self.config.client_name {
            builder = builder.client_name(name.clone());
        }
        if let Some(version) = &self.config.client_version {
            builder = builder.client_version(version.clone());
        }
        builder.build()
    }

    /// Prepare an execution of `operation`.
    ///
    /// Nothing is sent until [`Execution::run`] is awaited.
    #[must_use]
    pub fn send<O: GraphQLOperation>(
        &self,
        operation: O,
        cache_policy: CachePolicy,
    ) -> Execution<O> {
        let request = self.construct_request(operation, cache_policy);
        let interceptors = self.provider.interceptors(request.operation());
        Execution {
            request,
            chain: Arc::new(RequestChain::new(interceptors)),
        }
    }

    /// Send `operation` with the default cache policy and wait for the result.
    ///
    /// Returns `None` when the execution was cancelled.
    pub async fn fetch<O: GraphQLOperation>(
        &self,
        operation: O,
    ) -> Option<Result<GraphQLResult<O::Data>>> {
        self.send(operation, self.config.default_cache_policy).run().await
    }
}

/// One prepared execution of an operation.
#[derive(Debug)]
pub struct Execution<O: GraphQLOperation> {
    request: HttpRequest<O>,
    chain: Arc<RequestChain<O, GraphQLResult<O::Data>>>,
}

impl<O: GraphQLOperation> Execution<O> {
    /// The request descriptor of the first attempt.
    #[must_use]
    pub const fn request(&self) -> &HttpRequest<O> {
        &self.request
    }

    /// A handle able to cancel this execution from elsewhere.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle<O> {
        CancelHandle {
            chain: Arc::clone(&self.chain),
        }
    }

    /// Cancel the execution.
    pub fn cancel(&self) {
        self.chain.cancel();
    }

    /// Run the chain.
    ///
    /// When automatic persisted queries are active and the server answers with a
    /// persisted-query-not-found error, the chain runs exactly once more with the
    /// full document. Returns `None` when the execution was cancelled.
    pub async fn run(self) -> Option<Result<GraphQLResult<O::Data>>> {
        let retry = self.request.persisted_query_retry();
        let apq_active =
            self.request.plan().auto_persist_queries && !self.request.is_persisted_query_retry();

        let outcome = self.chain.kickoff(self.request).await?;
        match outcome {
            Ok(result) if apq_active && result.is_persisted_query_not_found() => {
                info!(
                    operation = retry.operation().operation_name(),
                    "persisted query not found, retrying with the document"
                );
                self.chain.kickoff(retry).await
            }
            outcome => {
                debug!(success = outcome.is_ok(), "execution finished");
                Some(outcome)
            }
        }
    }
}

/// Cancels an [`Execution`]. Cheap to clone and safe to use from any task.
#[derive(Debug)]
pub struct CancelHandle<O: GraphQLOperation> {
    chain: Arc<RequestChain<O, GraphQLResult<O::Data>>>,
}

impl<O: GraphQLOperation> Clone for CancelHandle<O> {
    fn clone(&self) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
        }
    }
}

impl<O: GraphQLOperation> CancelHandle<O> {
    /// Cancel the execution. Cannot be undone.
    pub fn cancel(&self) {
        self.chain.cancel();
    }

    /// Whether the execution was cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.chain.is_cancelled()
    }
}
