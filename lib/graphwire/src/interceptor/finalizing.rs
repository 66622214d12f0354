//! Terminal stage of every standard chain.

use std::future;

use graphwire_core::{Error, GraphQLOperation, HttpRequest, HttpResponse};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};

/// Turns the parsed value into the final result.
///
/// This stage does no parsing: an earlier stage must have stored a parsed value,
/// otherwise the attempt fails with [`Error::NilParsedValue`] carrying the raw
/// transport response and bytes.
#[derive(Debug, Default)]
pub struct FinalizingInterceptor {
    cancellation: Cancellation,
}

impl FinalizingInterceptor {
    /// Creates a new finalizing stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancellation: Cancellation::new(),
        }
    }
}

impl<O, P> Interceptor<O, P> for FinalizingInterceptor
where
    O: GraphQLOperation,
    P: Send,
{
    fn name(&self) -> &'static str {
        "finalizing"
    }

    fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    fn intercept<'a>(
        &'a self,
        _chain: &'a ChainContext,
        _request: &'a mut HttpRequest<O>,
        response: &'a mut HttpResponse<P>,
    ) -> InterceptorFuture<'a, P> {
        let flow = if self.cancellation.is_cancelled() {
            Flow::Cancelled
        } else if let Some(parsed) = response.take_parsed_response() {
            Flow::Complete(Ok(parsed))
        } else {
            Flow::Complete(Err(Error::NilParsedValue {
                http_response: response.http_response().cloned(),
                raw_data: response.raw_data().cloned(),
                fetch_source: response.source(),
            }))
        };

        Box::pin(future::ready(flow))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use assert2::{check, let_assert};
    use bytes::Bytes;
    use graphwire_core::{FetchSource, OperationType, Response};

    use super::*;

    struct Ping;

    impl GraphQLOperation for Ping {
        type Data = serde_json::Value;
        type Variables = serde_json::Value;

        fn operation_type(&self) -> OperationType {
            OperationType::Query
        }

        fn operation_name(&self) -> &str {
            "Ping"
        }

        fn query_document(&self) -> &str {
            "query Ping { ping }"
        }
    }

    fn request() -> HttpRequest<Ping> {
        let endpoint = url::Url::parse("https://api.example.com/graphql").expect("valid URL");
        HttpRequest::builder(Ping, endpoint).build()
    }

    fn context() -> ChainContext {
        ChainContext::new(1, Arc::new(Cancellation::new()))
    }

    #[tokio::test]
    async fn succeeds_with_the_parsed_value() {
        let stage = FinalizingInterceptor::new();
        let mut response = HttpResponse::new();
        response.set_parsed_response(42_u32);

        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;

        let_assert!(Flow::Complete(Ok(value)) = flow);
        check!(value == 42);
    }

    #[tokio::test]
    async fn fails_without_a_parsed_value() {
        let stage = FinalizingInterceptor::new();
        let raw = Bytes::from_static(b"<html>502 Bad Gateway</html>");
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "text/html".to_string());

        let mut response = HttpResponse::<u32>::new();
        response.set_transport_response(
            Response::new(200, headers, raw.clone()),
            FetchSource::Network,
        );

        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;

        let_assert!(
            Flow::Complete(Err(Error::NilParsedValue {
                http_response: Some(head),
                raw_data: Some(raw_data),
                fetch_source,
            })) = flow
        );
        check!(raw_data == raw);
        check!(head.status() == 200);
        check!(head.header("content-type") == Some("text/html"));
        check!(fetch_source == FetchSource::Network);
    }

    #[tokio::test]
    async fn cancelled_stage_never_completes() {
        let stage = FinalizingInterceptor::new();
        Interceptor::<Ping, u32>::cancel(&stage);

        for _ in 0..3 {
            let mut response = HttpResponse::new();
            response.set_parsed_response(7_u32);

            let flow = stage
                .intercept(&context(), &mut request(), &mut response)
                .await;

            check!(matches!(flow, Flow::Cancelled));
            check!(response.parsed_response() == Some(&7));
        }
    }
}
