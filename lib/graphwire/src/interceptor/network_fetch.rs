//! Network stage: sends the request through the transport collaborator.

use std::sync::Arc;

use graphwire_core::{FetchSource, GraphQLOperation, HttpClient, HttpRequest, HttpResponse};
use tracing::{debug, warn};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};

/// Materializes the request and executes it with an [`HttpClient`].
///
/// Build-time failures (GET parameters, POST body) and transport errors
/// complete the attempt. A response arriving after cancellation is dropped.
#[derive(Debug)]
pub struct NetworkFetchInterceptor<C> {
    client: Arc<C>,
    cancellation: Cancellation,
}

impl<C> NetworkFetchInterceptor<C> {
    /// Creates a network stage using the given client.
    #[must_use]
    pub const fn new(client: Arc<C>) -> Self {
        Self {
            client,
            cancellation: Cancellation::new(),
        }
    }
}

impl<O, P, C> Interceptor<O, P> for NetworkFetchInterceptor<C>
where
    O: GraphQLOperation,
    P: Send,
    C: HttpClient + 'static,
{
    fn name(&self) -> &'static str {
        "network_fetch"
    }

    fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    fn intercept<'a>(
        &'a self,
        chain: &'a ChainContext,
        request: &'a mut HttpRequest<O>,
        response: &'a mut HttpResponse<P>,
    ) -> InterceptorFuture<'a, P> {
        Box::pin(async move {
            if self.cancellation.is_cancelled() {
                return Flow::Cancelled;
            }

            let transport_request = match request.to_transport_request() {
                Ok(transport_request) => transport_request,
                Err(error) => {
                    warn!(%error, "cannot build transport request");
                    return Flow::Complete(Err(error));
                }
            };

            debug!(
                method = %transport_request.method(),
                url = %transport_request.url(),
                attempt = chain.attempt(),
                persisted_query_retry = request.is_persisted_query_retry(),
                "sending operation"
            );

            let result = self.client.execute(transport_request).await;

            if self.cancellation.is_cancelled() {
                debug!("cancelled while in flight, dropping response");
                return Flow::Cancelled;
            }

            match result {
                Ok(transport_response) => {
                    response.set_transport_response(transport_response, FetchSource::Network);
                    Flow::Proceed
                }
                Err(error) => Flow::Complete(Err(error)),
            }
        })
    }
}
