//! HTTP status validation stage.

use std::future;

use graphwire_core::{Error, GraphQLOperation, HttpRequest, HttpResponse, StatusCode};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};

/// Fails the attempt when the transport response is not a 2xx.
///
/// The error keeps the raw body so callers can inspect what the server said.
#[derive(Debug, Default)]
pub struct ResponseCodeInterceptor {
    cancellation: Cancellation,
}

impl ResponseCodeInterceptor {
    /// Creates a new status validation stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cancellation: Cancellation::new(),
        }
    }
}

impl<O, P> Interceptor<O, P> for ResponseCodeInterceptor
where
    O: GraphQLOperation,
    P: Send,
{
    fn name(&self) -> &'static str {
        "response_code"
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
        if self.cancellation.is_cancelled() {
            return Box::pin(future::ready(Flow::Cancelled));
        }

        let flow = match response.http_response() {
            Some(head) if !head.is_success() => {
                let status = head.status();
                let message = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or("unexpected status code");
                Flow::Complete(Err(Error::Http {
                    status,
                    message: message.to_string(),
                    body: response.raw_data().cloned(),
                }))
            }
            _ => Flow::Proceed,
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

    fn received(status: u16, body: &'static str) -> HttpResponse<u32> {
        let mut response = HttpResponse::new();
        response.set_transport_response(
            Response::new(status, HashMap::new(), Bytes::from_static(body.as_bytes())),
            FetchSource::Network,
        );
        response
    }

    #[tokio::test]
    async fn success_statuses_proceed() {
        let stage = ResponseCodeInterceptor::new();

        for status in [200, 204, 299] {
            let mut response = received(status, "{}");
            let flow = stage
                .intercept(&context(), &mut request(), &mut response)
                .await;
            check!(matches!(flow, Flow::Proceed), "status {status}");
        }
    }

    #[tokio::test]
    async fn missing_head_proceeds() {
        let stage = ResponseCodeInterceptor::new();
        let mut response = HttpResponse::<u32>::new();

        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;

        check!(matches!(flow, Flow::Proceed));
    }

    #[tokio::test]
    async fn other_statuses_fail_with_the_body() {
        let stage = ResponseCodeInterceptor::new();

        let mut response = received(503, "try later");
        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;

        let_assert!(Flow::Complete(Err(error)) = flow);
        check!(error.status() == Some(503));
        check!(error.body() == Some(&Bytes::from_static(b"try later")));
        let_assert!(Error::Http { message, .. } = error);
        check!(message == "Service Unavailable");

        let mut response = received(304, "");
        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;
        let_assert!(Flow::Complete(Err(Error::Http { status: 304, .. })) = flow);
    }

    #[tokio::test]
    async fn cancelled_stage_ignores_failures() {
        let stage = ResponseCodeInterceptor::new();
        Interceptor::<Ping, u32>::cancel(&stage);

        let mut response = received(500, "boom");
        let flow = stage
            .intercept(&context(), &mut request(), &mut response)
            .await;

        check!(matches!(flow, Flow::Cancelled));
    }
}
