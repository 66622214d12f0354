//! Typed parsing stage for the direct-decode chain.

use std::sync::Arc;

use graphwire_core::{
    FlexibleDecoder, GraphQLOperation, GraphQLResponse, GraphQLResult, HttpRequest, HttpResponse,
    Parseable, ResultSource,
};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};

/// Decodes the raw bytes straight into the operation's typed response with a
/// pluggable [`FlexibleDecoder`].
///
/// The result is assembled from the decoded `data` and `errors`; it has no
/// dependent keys since nothing is cached.
#[derive(Debug)]
pub struct CodableParsingInterceptor<D> {
    decoder: Arc<D>,
    cancellation: Cancellation,
}

impl<D> CodableParsingInterceptor<D> {
    /// Creates a parsing stage using the given decoder.
    #[must_use]
    pub const fn new(decoder: Arc<D>) -> Self {
        Self {
            decoder,
            cancellation: Cancellation::new(),
        }
    }
}

impl<O, D> Interceptor<O, GraphQLResult<O::Data>> for CodableParsingInterceptor<D>
where
    O: GraphQLOperation,
    D: FlexibleDecoder + 'static,
{
    fn name(&self) -> &'static str {
        "codable_parsing"
    }

    fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    fn intercept<'a>(
        &'a self,
        _chain: &'a ChainContext,
        _request: &'a mut HttpRequest<O>,
        response: &'a mut HttpResponse<GraphQLResult<O::Data>>,
    ) -> InterceptorFuture<'a, GraphQLResult<O::Data>> {
        let flow = if self.cancellation.is_cancelled() {
            Flow::Cancelled
        } else if let Some(raw) = response.raw_data() {
            match GraphQLResponse::<O::Data>::parse(raw, self.decoder.as_ref()) {
                Ok(decoded) => {
                    response.set_parsed_response(decoded.into_result(ResultSource::Server, None));
                    Flow::Proceed
                }
                Err(error) => Flow::Complete(Err(error)),
            }
        } else {
            Flow::Proceed
        };

        Box::pin(std::future::ready(flow))
    }
}
