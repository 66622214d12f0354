//! GraphQL results and errors.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key of a cache record.
pub type CacheKey = String;

/// Where a [`GraphQLResult`] was served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultSource {
    /// Served from the local cache.
    Cache,
    /// Served by the GraphQL server.
    Server,
}

/// The result of a GraphQL operation.
///
/// `data` and `errors` are not mutually exclusive: a server may return partial
/// data along with errors.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLResult<D> {
    /// The typed result data, or `None` if an error prevented a valid response.
    pub data: Option<D>,
    /// Errors reported by the server, or `None` if there were none.
    pub errors: Option<Vec<GraphQLError>>,
    /// Source of the data.
    pub source: ResultSource,
    /// Cache keys the data depends on; `None` when unknown or not cache-backed.
    pub dependent_keys: Option<HashSet<CacheKey>>,
}

impl<D> GraphQLResult<D> {
    /// Creates a new result.
    #[must_use]
    pub const fn new(
        data: Option<D>,
        errors: Option<Vec<GraphQLError>>,
        source: ResultSource,
        dependent_keys: Option<HashSet<CacheKey>>,
    ) -> Self {
        Self {
            data,
            errors,
            source,
            dependent_keys,
        }
    }

    /// Returns `true` if the server reported at least one error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }

    /// Returns `true` if the server did not know the persisted query hash.
    #[must_use]
    pub fn is_persisted_query_not_found(&self) -> bool {
        self.errors
            .iter()
            .flatten()
            .any(GraphQLError::is_persisted_query_not_found)
    }
}

/// An error entry from a GraphQL response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Locations in the document where the error occurred.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Path to the field that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// Additional error extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl GraphQLError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    /// Error code from `extensions.code`, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref()?.get("code")?.as_str()
    }

    /// Returns `true` for the automatic persisted query "not found" error.
    #[must_use]
    pub fn is_persisted_query_not_found(&self) -> bool {
        self.message == "PersistedQueryNotFound"
            || self.code() == Some("PERSISTED_QUERY_NOT_FOUND")
    }
}

impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(locations) = &self.locations
            && !locations.is_empty()
        {
            write!(f, " at ")?;
            for (i, loc) in locations.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}:{}", loc.line, loc.column)?;
            }
        }
        Ok(())
    }
}

/// Location of an error in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    /// Line number (1-based).
    pub line: u32,
    /// Column number (1-based).
    pub column: u32,
}

/// Segment of an error path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Field name.
    Field(String),
    /// List index.
    Index(usize),
}

/// Wire shape of a GraphQL response body.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLResponse<D> {
    /// Response data.
    pub data: Option<D>,
    /// Response errors.
    pub errors: Option<Vec<GraphQLError>>,
}

impl<D> GraphQLResponse<D> {
    /// Build the externally visible result from the decoded parts.
    #[must_use]
    pub fn into_result(
        self,
        source: ResultSource,
        dependent_keys: Option<HashSet<CacheKey>>,
    ) -> GraphQLResult<D> {
        GraphQLResult::new(self.data, self.errors, source, dependent_keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_data_and_errors() {
        let response: GraphQLResponse<Value> = serde_json::from_str(
            r#"{
                "data": { "hero": null },
                "errors": [{ "message": "boom", "path": ["hero", 0] }]
            }"#,
        )
        .expect("decode");

        let result = response.into_result(ResultSource::Server, None);
        assert!(result.data.is_some());
        assert!(result.has_errors());
        assert_eq!(
            result.errors.as_ref().and_then(|errors| errors.first()).and_then(|e| e.path.clone()),
            Some(vec![
                PathSegment::Field("hero".to_string()),
                PathSegment::Index(0)
            ])
        );
    }

    #[test]
    fn detects_persisted_query_not_found() {
        let by_message = GraphQLError::new("PersistedQueryNotFound");
        assert!(by_message.is_persisted_query_not_found());

        let by_code = GraphQLError {
            extensions: Some(serde_json::json!({ "code": "PERSISTED_QUERY_NOT_FOUND" })),
            ..GraphQLError::new("Persisted query not found")
        };
        assert!(by_code.is_persisted_query_not_found());

        assert!(!GraphQLError::new("Cannot query field").is_persisted_query_not_found());

        let result: GraphQLResult<Value> = GraphQLResult::new(
            None,
            Some(vec![by_code]),
            ResultSource::Server,
            None,
        );
        assert!(result.is_persisted_query_not_found());
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Hero {
        name: String,
    }

    fn decode<D: serde::de::DeserializeOwned>(raw: &str) -> GraphQLResponse<D> {
        serde_json::from_str(raw).expect("decode")
    }

    #[test]
    fn decodes_data_without_default() {
        let response: GraphQLResponse<Hero> = decode(r#"{ "data": { "name": "R2-D2" } }"#);
        assert_eq!(
            response.data,
            Some(Hero {
                name: "R2-D2".to_string()
            })
        );
        assert!(response.errors.is_none());

        let errors_only: GraphQLResponse<Hero> = decode(r#"{ "errors": [{ "message": "boom" }] }"#);
        assert!(errors_only.data.is_none());
        assert_eq!(errors_only.errors.map(|errors| errors.len()), Some(1));
    }

    #[test]
    fn error_display_with_locations() {
        let error = GraphQLError {
            locations: Some(vec![ErrorLocation { line: 1, column: 9 }]),
            ..GraphQLError::new("Unknown field")
        };
        assert_eq!(error.to_string(), "Unknown field at 1:9");
    }
}
