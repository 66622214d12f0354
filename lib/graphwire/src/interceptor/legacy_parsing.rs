//! Untyped JSON parsing stage for the cache-first chain.

use std::collections::HashSet;
use std::sync::Arc;

use graphwire_core::{
    CacheKey, CachePolicy, Error, FlexibleDecoder, GraphQLError, GraphQLOperation, GraphQLResult,
    HttpRequest, HttpResponse, JsonDecoder, OperationType, Result, ResultSource, from_json_value,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};
use crate::cache::{CacheRecord, CacheStore};

/// Decodes the raw bytes into an untyped JSON value, then maps it to the
/// operation's data type.
///
/// Along the way it records the cache keys the data depends on and, for
/// queries, writes the data to the [`CacheStore`] unless the policy is
/// [`CachePolicy::FetchIgnoringCacheCompletely`].
#[derive(Debug)]
pub struct LegacyParsingInterceptor<S> {
    store: Arc<S>,
    cancellation: Cancellation,
}

impl<S> LegacyParsingInterceptor<S> {
    /// Creates a parsing stage writing into the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cancellation: Cancellation::new(),
        }
    }
}

impl<O, S> Interceptor<O, GraphQLResult<O::Data>> for LegacyParsingInterceptor<S>
where
    O: GraphQLOperation,
    S: CacheStore,
{
    fn name(&self) -> &'static str {
        "legacy_parsing"
    }

    fn cancellation(&self) -> &Cancellation {
        &self.cancellation
    }

    fn intercept<'a>(
        &'a self,
        _chain: &'a ChainContext,
        request: &'a mut HttpRequest<O>,
        response: &'a mut HttpResponse<GraphQLResult<O::Data>>,
    ) -> InterceptorFuture<'a, GraphQLResult<O::Data>> {
        Box::pin(async move {
            if self.cancellation.is_cancelled() {
                return Flow::Cancelled;
            }

            let Some(raw) = response.raw_data().cloned() else {
                return Flow::Proceed;
            };

            let operation = request.operation();
            let (result, record) =
                match parse_response::<O::Data>(&raw, operation.operation_type()) {
                    Ok(parsed) => parsed,
                    Err(error) => return Flow::Complete(Err(error)),
                };

            if let Some(record) = record
                && operation.operation_type() == OperationType::Query
                && request.cache_policy() != CachePolicy::FetchIgnoringCacheCompletely
            {
                match operation.cache_key() {
                    Ok(key) => {
                        debug!(%key, keys = record.dependent_keys.len(), "writing cache record");
                        if let Err(error) = self.store.write(key, record).await {
                            warn!(%error, "cache write failed");
                        }
                    }
                    Err(error) => warn!(%error, "cannot compute cache key"),
                }
            }

            if self.cancellation.is_cancelled() {
                return Flow::Cancelled;
            }

            response.set_parsed_response(result);
            Flow::Proceed
        })
    }
}

/// Parse a raw body into a result and the record to cache, if any.
fn parse_response<D: DeserializeOwned>(
    raw: &[u8],
    operation_type: OperationType,
) -> Result<(GraphQLResult<D>, Option<CacheRecord>)> {
    let Value::Object(mut body) = JsonDecoder.decode::<Value>(raw)? else {
        return Err(Error::UnexpectedType(
            "response body is not a JSON object".to_string(),
        ));
    };

    let errors = body
        .remove("errors")
        .filter(|errors| !errors.is_null())
        .map(from_json_value::<Vec<GraphQLError>>)
        .transpose()?;

    let Some(data) = body.remove("data").filter(|data| !data.is_null()) else {
        return Ok((
            GraphQLResult::new(None, errors, ResultSource::Server, None),
            None,
        ));
    };
    if !data.is_object() {
        return Err(Error::UnexpectedType("`data` is not a JSON object".to_string()));
    }

    let dependent_keys = dependent_keys(operation_type.root_cache_key(), &data);
    let typed = from_json_value(data.clone())?;
    let result = GraphQLResult::new(
        Some(typed),
        errors,
        ResultSource::Server,
        Some(dependent_keys.clone()),
    );

    Ok((
        result,
        Some(CacheRecord {
            data,
            dependent_keys,
        }),
    ))
}

/// Every `record.field` key reachable from the root object.
fn dependent_keys(root: &str, data: &Value) -> HashSet<CacheKey> {
    let mut keys = HashSet::new();
    collect_keys(root, data, &mut keys);
    keys
}

fn collect_keys(path: &str, value: &Value, keys: &mut HashSet<CacheKey>) {
    match value {
        Value::Object(fields) => {
            for (name, field) in fields {
                let key = format!("{path}.{name}");
                collect_keys(&key, field, keys);
                keys.insert(key);
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_keys(&format!("{path}.{index}"), item, keys);
            }
        }
        _ => {}
    }
}
