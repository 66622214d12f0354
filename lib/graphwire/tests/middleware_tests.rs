//! Middleware tests on the hyper transport, driven through a request chain.

use std::sync::Arc;

use assert2::let_assert;
use graphwire::middleware::{BearerAuthLayer, ConcurrencyLimitLayer};
use graphwire::{
    CodableInterceptorProvider, GraphQLConfig, GraphQLOperation, HttpClient, HyperClient, Method,
    OperationType, Request, RequestChainNetworkTransport,
};
use serde_json::{Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

struct Viewer;

impl GraphQLOperation for Viewer {
    type Data = Value;
    type Variables = Value;

    fn operation_type(&self) -> OperationType {
        OperationType::Query
    }

    fn operation_name(&self) -> &str {
        "Viewer"
    }

    fn query_document(&self) -> &str {
        "query Viewer { viewer { login } }"
    }
}

fn viewer_body() -> Value {
    json!({ "data": { "viewer": { "login": "alice" } } })
}

fn transport(
    server: &MockServer,
    client: HyperClient,
) -> RequestChainNetworkTransport<CodableInterceptorProvider<HyperClient>> {
    let endpoint = Url::parse(&format!("{}/graphql", server.uri())).expect("url");
    RequestChainNetworkTransport::with_config(
        CodableInterceptorProvider::new(Arc::new(client)),
        endpoint,
        GraphQLConfig::default(),
    )
}

#[tokio::test]
async fn bearer_auth_adds_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("Authorization", "Bearer my-secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder()
        .with_bearer_auth("my-secret-token")
        .build();

    let_assert!(Some(Ok(_)) = transport(&server, client).fetch(Viewer).await);
}

#[tokio::test]
async fn bearer_auth_keeps_an_explicit_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder().with_bearer_auth("ignored").build();
    let config = GraphQLConfig::builder()
        .header("Authorization", "Basic YWxpY2U6c2VjcmV0")
        .build();
    let endpoint = Url::parse(&format!("{}/graphql", server.uri())).expect("url");
    let transport = RequestChainNetworkTransport::with_config(
        CodableInterceptorProvider::new(Arc::new(client)),
        endpoint,
        config,
    );

    let_assert!(Some(Ok(_)) = transport.fetch(Viewer).await);
}

#[tokio::test]
async fn logging_keeps_the_exchange_intact() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_body()))
        .expect(2)
        .mount(&server)
        .await;

    for client in [
        HyperClient::builder().with_logging().build(),
        HyperClient::builder().with_debug_logging().with_defaults().build(),
    ] {
        let_assert!(Some(Ok(result)) = transport(&server, client).fetch(Viewer).await);
        assert_eq!(result.data, Some(json!({ "viewer": { "login": "alice" } })));
    }
}

#[tokio::test]
async fn composed_layers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(viewer_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder()
        .with_logging()
        .layer(BearerAuthLayer::new("test-token"))
        .with(ConcurrencyLimitLayer::new(4))
        .build();

    let_assert!(Some(Ok(_)) = transport(&server, client).fetch(Viewer).await);
}

#[tokio::test]
async fn raw_client_executes_requests() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::new();
    let url = Url::parse(&format!("{}/health", server.uri())).expect("url");
    let response = client
        .execute(Request::builder(Method::Get, url).build())
        .await
        .expect("response");

    assert_eq!(response.status(), 204);
    assert!(response.body().is_empty());
}
