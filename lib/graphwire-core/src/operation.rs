//! GraphQL operation description.

use derive_more::Display;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::{CacheKey, Error, Result};

/// Kind of GraphQL operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OperationType {
    /// A read-only query.
    #[display("query")]
    Query,
    /// A mutation with side effects.
    #[display("mutation")]
    Mutation,
    /// A subscription.
    #[display("subscription")]
    Subscription,
}

impl OperationType {
    /// Root key under which the operation's data is normalized in the cache.
    #[must_use]
    pub const fn root_cache_key(self) -> &'static str {
        match self {
            Self::Query => "QUERY_ROOT",
            Self::Mutation => "MUTATION_ROOT",
            Self::Subscription => "SUBSCRIPTION_ROOT",
        }
    }
}

/// A typed GraphQL operation.
///
/// Implementations are immutable descriptions created by the caller; the
/// pipeline only reads them.
///
/// # Example
///
/// ```
/// use graphwire_core::{GraphQLOperation, OperationType};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct HeroData {
///     hero: Option<Hero>,
/// }
///
/// #[derive(Debug, Deserialize)]
/// struct Hero {
///     name: String,
/// }
///
/// struct HeroQuery;
///
/// impl GraphQLOperation for HeroQuery {
///     type Data = HeroData;
///     type Variables = serde_json::Value;
///
///     fn operation_type(&self) -> OperationType {
///         OperationType::Query
///     }
///
///     fn operation_name(&self) -> &str {
///         "Hero"
///     }
///
///     fn query_document(&self) -> &str {
///         "query Hero { hero { name } }"
///     }
/// }
///
/// assert_eq!(HeroQuery.persisted_query_hash().len(), 64);
/// ```
pub trait GraphQLOperation: Send + Sync + 'static {
    /// Typed shape of the `data` field.
    type Data: DeserializeOwned + Send + Sync + 'static;

    /// Typed shape of the variables.
    type Variables: Serialize + Send + Sync;

    /// Query, mutation or subscription.
    fn operation_type(&self) -> OperationType;

    /// Name of the operation (`operationName` on the wire).
    fn operation_name(&self) -> &str;

    /// Full document text.
    fn query_document(&self) -> &str;

    /// Stable identifier used for persisted-query lookups, if generated.
    fn operation_identifier(&self) -> Option<&str> {
        None
    }

    /// Variables for this execution.
    fn variables(&self) -> Option<&Self::Variables> {
        None
    }

    /// Hash sent in the `persistedQuery` extension.
    ///
    /// Uses the operation identifier when present, otherwise the hex-encoded
    /// SHA-256 of the document.
    fn persisted_query_hash(&self) -> String {
        self.operation_identifier()
            .map_or_else(|| sha256_hex(self.query_document()), str::to_owned)
    }

    /// Key under which the operation's result is cached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cache`] if the variables cannot be serialized.
    fn cache_key(&self) -> Result<CacheKey> {
        let variables = self
            .variables()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::cache(format!("cannot serialize variables: {e}")))?
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(self.query_document().as_bytes());
        hasher.update(variables.as_bytes());

        Ok(format!(
            "{}.{}:{}",
            self.operation_type().root_cache_key(),
            self.operation_name(),
            hex::encode(hasher.finalize())
        ))
    }
}

/// Hex-encoded SHA-256 digest of a string.
#[must_use]
pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}
