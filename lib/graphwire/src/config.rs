//! Client configuration types.

use std::collections::HashMap;
use std::time::Duration;

use graphwire_core::CachePolicy;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}

/// Request policy applied by [`crate::RequestChainNetworkTransport`] to every
/// operation it sends.
#[derive(Debug, Clone, Default)]
pub struct GraphQLConfig {
    /// Send the persisted query hash instead of the document.
    pub auto_persist_queries: bool,
    /// Send queries with `GET`.
    pub use_get_for_queries: bool,
    /// Send the persisted query retry with `GET`.
    pub use_get_for_persisted_query_retry: bool,
    /// Headers added to every request.
    pub additional_headers: HashMap<String, String>,
    /// Value of the `apollographql-client-name` header.
    pub client_name: Option<String>,
    /// Value of the `apollographql-client-version` header.
    pub client_version: Option<String>,
    /// Cache policy used by [`crate::RequestChainNetworkTransport::fetch`].
    pub default_cache_policy: CachePolicy,
}

impl GraphQLConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> GraphQLConfigBuilder {
        GraphQLConfigBuilder::default()
    }
}

/// Builder for [`GraphQLConfig`].
#[derive(Debug, Clone, Default)]
pub struct GraphQLConfigBuilder {
    auto_persist_queries: Option<bool>,
    use_get_for_queries: Option<bool>,
    use_get_for_persisted_query_retry: Option<bool>,
    additional_headers: HashMap<String, String>,
    client_name: Option<String>,
    client_version: Option<String>,
    default_cache_policy: Option<CachePolicy>,
}

impl GraphQLConfigBuilder {
    /// Enable automatic persisted queries.
    #[must_use]
    pub const fn auto_persist_queries(mut self, enabled: bool) -> Self {
        self.auto_persist_queries = Some(enabled);
        self
    }

    /// Send queries with `GET`.
    #[must_use]
    pub const fn use_get_for_queries(mut self, enabled: bool) -> Self {
        self.use_get_for_queries = Some(enabled);
        self
    }

    /// Send the persisted query retry with `GET`.
    #[must_use]
    pub const fn use_get_for_persisted_query_retry(mut self, enabled: bool) -> Self {
        self.use_get_for_persisted_query_retry = Some(enabled);
        self
    }

    /// Add a header to every request.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.insert(name.into(), value.into());
        self
    }

    /// Set the client name header.
    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Set the client version header.
    #[must_use]
    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = Some(version.into());
        self
    }

    /// Set the default cache policy.
    #[must_use]
    pub const fn default_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.default_cache_policy = Some(policy);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> GraphQLConfig {
        GraphQLConfig {
            auto_persist_queries: self.auto_persist_queries.unwrap_or_default(),
            use_get_for_queries: self.use_get_for_queries.unwrap_or_default(),
            use_get_for_persisted_query_retry: self
                .use_get_for_persisted_query_retry
                .unwrap_or_default(),
            additional_headers: self.additional_headers,
            client_name: self.client_name,
            client_version: self.client_version,
            default_cache_policy: self.default_cache_policy.unwrap_or_default(),
        }
    }
}
