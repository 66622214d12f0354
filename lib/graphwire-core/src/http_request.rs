//! Request descriptor and request builder.
//!
//! An [`HttpRequest`] describes one attempt at sending an operation: endpoint,
//! headers, cache policy and the persisted-query settings. [`HttpRequest::plan`]
//! decides the HTTP method and which parts of the body are sent, and
//! [`HttpRequest::to_transport_request`] materializes the [`Request`] handed to
//! the transport.
//!
//! # Example
//!
//! ```
//! use graphwire_core::{GraphQLOperation, HttpRequest, Method, OperationType};
//! use url::Url;
//!
//! struct HeroQuery;
//!
//! impl GraphQLOperation for HeroQuery {
//!     type Data = serde_json::Value;
//!     type Variables = serde_json::Value;
//!
//!     fn operation_type(&self) -> OperationType {
//!         OperationType::Query
//!     }
//!
//!     fn operation_name(&self) -> &str {
//!         "Hero"
//!     }
//!
//!     fn query_document(&self) -> &str {
//!         "query Hero { hero { name } }"
//!     }
//! }
//!
//! let endpoint = Url::parse("https://api.example.com/graphql").unwrap();
//! let request = HttpRequest::builder(HeroQuery, endpoint)
//!     .auto_persist_queries(true)
//!     .use_get_for_persisted_query_retry(true)
//!     .build();
//!
//! let plan = request.plan();
//! assert_eq!(plan.method, Method::Get);
//! assert!(!plan.send_query_document);
//!
//! let retry = request.persisted_query_retry().plan();
//! assert!(retry.send_query_document);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::{ContentType, GraphQLOperation, Method, OperationType, Request, Result};

/// Header carrying the operation type.
pub const OPERATION_TYPE_HEADER: &str = "X-APOLLO-OPERATION-TYPE";
/// Header carrying the operation name.
pub const OPERATION_NAME_HEADER: &str = "X-APOLLO-OPERATION-NAME";
/// Header carrying the operation identifier.
pub const OPERATION_ID_HEADER: &str = "X-APOLLO-OPERATION-ID";
/// Header carrying the client name.
pub const CLIENT_NAME_HEADER: &str = "apollographql-client-name";
/// Header carrying the client version.
pub const CLIENT_VERSION_HEADER: &str = "apollographql-client-version";

/// Version of the automatic persisted query protocol.
pub const PERSISTED_QUERY_VERSION: u8 = 1;

/// How an operation interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Serve from the cache when possible, fetch otherwise.
    #[default]
    ReturnCacheDataElseFetch,
    /// Always fetch, still writing the result to the cache.
    FetchIgnoringCacheData,
    /// Always fetch and never touch the cache.
    FetchIgnoringCacheCompletely,
    /// Serve from the cache only; a miss is an error.
    ReturnCacheDataDontFetch,
}

/// Method and body decisions for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPlan {
    /// HTTP method.
    pub method: Method,
    /// Whether the full document is sent.
    pub send_query_document: bool,
    /// Whether the `persistedQuery` extension is sent.
    pub auto_persist_queries: bool,
    /// Whether the operation identifier is sent as `id`.
    pub send_operation_identifier: bool,
}

/// The `persistedQuery` extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedQuery {
    /// Protocol version.
    pub version: u8,
    /// Hash of the document.
    pub sha256_hash: String,
}

/// Request extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Extensions {
    /// Automatic persisted query extension.
    pub persisted_query: PersistedQuery,
}

/// Body of a GraphQL request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody<'a, V> {
    /// Operation identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<&'a str>,
    /// Document text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<&'a str>,
    /// Operation name.
    pub operation_name: &'a str,
    /// Variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<&'a V>,
    /// Extensions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Extensions>,
}

/// GET query parameters; `variables` and `extensions` are JSON text.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetParameters<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    operation_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extensions: Option<String>,
}

/// Request descriptor for one attempt.
pub struct HttpRequest<O> {
    endpoint: Url,
    operation: Arc<O>,
    additional_headers: HashMap<String, String>,
    content_type: ContentType,
    cache_policy: CachePolicy,
    client_name: Option<String>,
    client_version: Option<String>,
    auto_persist_queries: bool,
    use_get_for_queries: bool,
    use_get_for_persisted_query_retry: bool,
    is_persisted_query_retry: bool,
}

impl<O> Clone for HttpRequest<O> {
    fn clone(&self) -> Self {
        Self {
            endpoint: self.endpoint.clone(),
            operation: Arc::clone(&self.operation),
            additional_headers: self.additional_headers.clone(),
            content_type: self.content_type,
            cache_policy: self.cache_policy,
            client_name: self.client_name.clone(),
            client_version: self.client_version.clone(),
            auto_persist_queries: self.auto_persist_queries,
            use_get_for_queries: self.use_get_for_queries,
            use_get_for_persisted_query_retry: self.use_get_for_persisted_query_retry,
            is_persisted_query_retry: self.is_persisted_query_retry,
        }
    }
}

impl<O: GraphQLOperation> std::fmt::Debug for HttpRequest<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("endpoint", &self.endpoint.as_str())
            .field("operation", &self.operation.operation_name())
            .field("cache_policy", &self.cache_policy)
            .field("auto_persist_queries", &self.auto_persist_queries)
            .field("use_get_for_queries", &self.use_get_for_queries)
            .field(
                "use_get_for_persisted_query_retry",
                &self.use_get_for_persisted_query_retry,
            )
            .field("is_persisted_query_retry", &self.is_persisted_query_retry)
            .finish_non_exhaustive()
    }
}

impl<O: GraphQLOperation> HttpRequest<O> {
    /// Creates a new [`HttpRequestBuilder`].
    #[must_use]
    pub fn builder(operation: O, endpoint: Url) -> HttpRequestBuilder<O> {
        HttpRequestBuilder::new(Arc::new(operation), endpoint)
    }

    /// GraphQL endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// The operation being sent.
    #[must_use]
    pub fn operation(&self) -> &O {
        &self.operation
    }

    /// Shared handle on the operation.
    #[must_use]
    pub fn operation_arc(&self) -> Arc<O> {
        Arc::clone(&self.operation)
    }

    /// Cache policy.
    #[must_use]
    pub const fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Whether automatic persisted queries are enabled.
    #[must_use]
    pub const fn auto_persist_queries(&self) -> bool {
        self.auto_persist_queries
    }

    /// Whether queries go through GET.
    #[must_use]
    pub const fn use_get_for_queries(&self) -> bool {
        self.use_get_for_queries
    }

    /// Whether persisted-query retries go through GET.
    #[must_use]
    pub const fn use_get_for_persisted_query_retry(&self) -> bool {
        self.use_get_for_persisted_query_retry
    }

    /// Whether this attempt is the retry after a persisted-query miss.
    #[must_use]
    pub const fn is_persisted_query_retry(&self) -> bool {
        self.is_persisted_query_retry
    }

    /// Extra headers set by the caller or by stages.
    #[must_use]
    pub fn additional_headers(&self) -> &HashMap<String, String> {
        &self.additional_headers
    }

    /// Set a header on this attempt, replacing any header of the same name.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        set_header(&mut self.additional_headers, name.into(), value.into());
    }

    /// Whether the operation identifier is sent.
    #[must_use]
    pub fn send_operation_identifier(&self) -> bool {
        self.operation.operation_identifier().is_some()
    }

    /// A new descriptor for the retry after a persisted-query miss.
    ///
    /// `self` is left untouched.
    #[must_use]
    pub fn persisted_query_retry(&self) -> Self {
        let mut retry = self.clone();
        retry.is_persisted_query_retry = true;
        retry
    }

    /// Decide the method and body contents for this attempt.
    #[must_use]
    pub fn plan(&self) -> RequestPlan {
        let (use_get, send_query_document, auto_persist_queries) =
            match self.operation.operation_type() {
                OperationType::Query if self.is_persisted_query_retry => {
                    (self.use_get_for_persisted_query_retry, true, true)
                }
                OperationType::Query => (
                    self.use_get_for_queries
                        || (self.auto_persist_queries && self.use_get_for_persisted_query_retry),
                    !self.auto_persist_queries,
                    self.auto_persist_queries,
                ),
                OperationType::Mutation if self.is_persisted_query_retry => (false, true, true),
                OperationType::Mutation => {
                    (false, !self.auto_persist_queries, self.auto_persist_queries)
                }
                OperationType::Subscription => (false, true, false),
            };

        RequestPlan {
            method: if use_get { Method::Get } else { Method::Post },
            send_query_document,
            auto_persist_queries,
            send_operation_identifier: self.send_operation_identifier(),
        }
    }

    /// Build the body for a plan.
    #[must_use]
    pub fn request_body(&self, plan: &RequestPlan) -> RequestBody<'_, O::Variables> {
        let operation = self.operation.as_ref();
        RequestBody {
            id: operation
                .operation_identifier()
                .filter(|_| plan.send_operation_identifier),
            query: plan
                .send_query_document
                .then(|| operation.query_document()),
            operation_name: operation.operation_name(),
            variables: operation.variables(),
            extensions: plan.auto_persist_queries.then(|| Extensions {
                persisted_query: PersistedQuery {
                    version: PERSISTED_QUERY_VERSION,
                    sha256_hash: operation.persisted_query_hash(),
                },
            }),
        }
    }

    /// Headers sent with every attempt.
    ///
    /// Caller headers replace the defaults; names compare ignoring ASCII case.
    #[must_use]
    pub fn headers(&self) -> HashMap<String, String> {
        let operation = self.operation.as_ref();
        let mut headers = HashMap::new();
        headers.insert(
            "Content-Type".to_string(),
            self.content_type.as_str().to_string(),
        );
        headers.insert(
            OPERATION_TYPE_HEADER.to_string(),
            operation.operation_type().to_string(),
        );
        headers.insert(
            OPERATION_NAME_HEADER.to_string(),
            operation.operation_name().to_string(),
        );
        if let Some(id) = operation.operation_identifier() {
            headers.insert(OPERATION_ID_HEADER.to_string(), id.to_string());
        }
        if let Some(name) = &self.client_name {
            headers.insert(CLIENT_NAME_HEADER.to_string(), name.clone());
        }
        if let Some(version) = &self.client_version {
            headers.insert(CLIENT_VERSION_HEADER.to_string(), version.clone());
        }
        for (name, value) in &self.additional_headers {
            set_header(&mut headers, name.clone(), value.clone());
        }
        headers
    }

    /// Materialize the transport request for this attempt.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::QueryParamsSerialization`] if a GET body cannot be
    /// embedded in the URL, or [`crate::Error::BodySerialization`] if a POST body
    /// cannot be serialized. There is no fallback from GET to POST.
    pub fn to_transport_request(&self) -> Result<Request<Bytes>> {
        let plan = self.plan();
        let body = self.request_body(&plan);

        let builder = match plan.method {
            Method::Get => Request::builder(Method::Get, get_url(&self.endpoint, &body)?),
            Method::Post => {
                Request::builder(Method::Post, self.endpoint.clone()).body(crate::to_json(&body)?)
            }
        };

        Ok(builder.headers(self.headers()).build())
    }
}

/// Insert a header, dropping any existing entry whose name differs only in case.
fn set_header(headers: &mut HashMap<String, String>, name: String, value: String) {
    headers.retain(|existing, _| !existing.eq_ignore_ascii_case(&name));
    headers.insert(name, value);
}

/// Embed a body in the endpoint's query string.
fn get_url<V: Serialize>(endpoint: &Url, body: &RequestBody<'_, V>) -> Result<Url> {
    let to_json_text = |value: std::result::Result<String, serde_json::Error>| {
        value.map_err(|e| crate::Error::query_params(e.to_string()))
    };

    let parameters = GetParameters {
        id: body.id,
        query: body.query,
        operation_name: body.operation_name,
        variables: body
            .variables
            .map(|variables| to_json_text(serde_json::to_string(variables)))
            .transpose()?,
        extensions: body
            .extensions
            .as_ref()
            .map(|extensions| to_json_text(serde_json::to_string(extensions)))
            .transpose()?,
    };
    let query = crate::to_query_string(&parameters)?;

    let mut url = endpoint.clone();
    let merged = match endpoint.query() {
        Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
        _ => query,
    };
    url.set_query(Some(&merged));
    Ok(url)
}

/// Builder for [`HttpRequest`].
pub struct HttpRequestBuilder<O> {
    request: HttpRequest<O>,
}

impl<O: GraphQLOperation> HttpRequestBuilder<O> {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new(operation: Arc<O>, endpoint: Url) -> Self {
        Self {
            request: HttpRequest {
                endpoint,
                operation,
                additional_headers: HashMap::new(),
                content_type: ContentType::Json,
                cache_policy: CachePolicy::default(),
                client_name: None,
                client_version: None,
                auto_persist_queries: false,
                use_get_for_queries: false,
                use_get_for_persisted_query_retry: false,
                is_persisted_query_retry: false,
            },
        }
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.add_header(name, value);
        self
    }

    /// Sets multiple headers.
    #[must_use]
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        for (name, value) in headers {
            self.request.add_header(name, value);
        }
        self
    }

    /// Sets the cache policy.
    #[must_use]
    pub const fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.request.cache_policy = cache_policy;
        self
    }

    /// Sets the client name header.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.request.client_name = Some(name.into());
        self
    }

    /// Sets the client version header.
    #[must_use]
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.request.client_version = Some(version.into());
        self
    }

    /// Enables automatic persisted queries.
    #[must_use]
    pub const fn auto_persist_queries(mut self, enabled: bool) -> Self {
        self.request.auto_persist_queries = enabled;
        self
    }

    /// Sends queries with GET.
    #[must_use]
    pub const fn use_get_for_queries(mut self, enabled: bool) -> Self {
        self.request.use_get_for_queries = enabled;
        self
    }

    /// Sends persisted-query retries of queries with GET.
    #[must_use]
    pub const fn use_get_for_persisted_query_retry(mut self, enabled: bool) -> Self {
        self.request.use_get_for_persisted_query_retry = enabled;
        self
    }

    /// Builds the [`HttpRequest`].
    #[must_use]
    pub fn build(self) -> HttpRequest<O> {
        self.request
    }
}
