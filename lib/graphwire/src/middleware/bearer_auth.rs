//! Bearer token authentication middleware.
//!
//! Adds an `Authorization: Bearer <token>` header to outgoing requests that do
//! not already carry an `Authorization` header.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service, ServiceExt};

use crate::{Error, Request, Response, Result};

/// Layer that adds bearer token authentication to requests.
///
/// ```ignore
/// use graphwire::middleware::BearerAuthLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(BearerAuthLayer::new("my-secret-token"))
///     .service(client);
/// ```
#[derive(Debug, Clone)]
pub struct BearerAuthLayer {
    token: Arc<str>,
}

impl BearerAuthLayer {
    /// Create a bearer auth layer with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Service that adds bearer token authentication to requests.
#[derive(Debug, Clone)]
pub struct BearerAuth<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> BearerAuth<S> {
    /// Create a bearer auth service wrapping the given service.
    pub fn new(inner: S, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: Arc::from(token.into()),
        }
    }

    fn authorize(&self, request: &mut Request<Bytes>) {
        let headers = request.headers_mut();
        if !headers
            .keys()
            .any(|name| name.eq_ignore_ascii_case("authorization"))
        {
            headers.insert("Authorization".to_string(), format!("Bearer {}", self.token));
        }
    }
}

impl<S> Service<Request<Bytes>> for BearerAuth<S>
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

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        self.authorize(&mut request);

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.ready().await?.call(request).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;

    fn request() -> crate::RequestBuilder<Bytes> {
        let url = url::Url::parse("https://api.example.com/graphql").expect("valid URL");
        Request::builder(Method::Post, url)
    }

    #[test]
    fn adds_missing_authorization() {
        let auth = BearerAuth::new((), "token");
        let mut request = request().build();

        auth.authorize(&mut request);
        assert_eq!(request.header("Authorization"), Some("Bearer token"));
    }

    #[test]
    fn keeps_existing_authorization() {
        let auth = BearerAuth::new((), "token");
        let mut request = request().header("authorization", "Basic abc").build();

        auth.authorize(&mut request);
        assert_eq!(request.header("authorization"), Some("Basic abc"));
        assert_eq!(request.header("Authorization"), None);
    }
}
