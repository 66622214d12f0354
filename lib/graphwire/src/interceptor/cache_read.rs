//! Cache-first stage.

use std::sync::Arc;

use graphwire_core::{
    CachePolicy, Error, FetchSource, GraphQLOperation, GraphQLResult, HttpRequest, HttpResponse,
    OperationType, ResultSource, from_json_value,
};
use tracing::{debug, warn};

use super::{Cancellation, ChainContext, Flow, Interceptor, InterceptorFuture};
use crate::cache::{CacheRecord, CacheStore};

/// Serves queries from a [`CacheStore`] according to the request's [`CachePolicy`].
///
/// | policy | hit | miss |
/// |---|---|---|
/// | `ReturnCacheDataElseFetch` | complete with cached data | proceed |
/// | `ReturnCacheDataDontFetch` | complete with cached data | fail with [`Error::CacheMiss`] |
/// | `FetchIgnoringCacheData` | proceed | proceed |
/// | `FetchIgnoringCacheCompletely` | proceed | proceed |
///
/// Mutations and subscriptions always proceed. A failing store read counts as a miss.
#[derive(Debug)]
pub struct LegacyCacheReadInterceptor<S> {
    store: Arc<S>,
    cancellation: Cancellation,
}

impl<S> LegacyCacheReadInterceptor<S> {
    /// Creates a cache read stage over the given store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self {
            store,
            cancellation: Cancellation::new(),
        }
    }
}

fn cached_result<D>(record: CacheRecord) -> graphwire_core::Result<GraphQLResult<D>>
where
    D: serde::de::DeserializeOwned,
{
    let data = from_json_value(record.data)?;
    Ok(GraphQLResult::new(
        Some(data),
        None,
        ResultSource::Cache,
        Some(record.dependent_keys),
    ))
}

impl<O, S> Interceptor<O, GraphQLResult<O::Data>> for LegacyCacheReadInterceptor<S>
where
    O: GraphQLOperation,
    S: CacheStore,
{
    fn name(&self) -> &'static str {
        "legacy_cache_read"
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

            let policy = request.cache_policy();
            if request.operation().operation_type() != OperationType::Query
                || matches!(
                    policy,
                    CachePolicy::FetchIgnoringCacheData | CachePolicy::FetchIgnoringCacheCompletely
                )
            {
                return Flow::Proceed;
            }

            let key = match request.operation().cache_key() {
                Ok(key) => key,
                Err(error) => return Flow::Complete(Err(error)),
            };

            let record = self.store.read(&key).await.unwrap_or_else(|error| {
                warn!(%error, %key, "cache read failed, treating as a miss");
                None
            });

            if self.cancellation.is_cancelled() {
                return Flow::Cancelled;
            }

            match record.map(cached_result::<O::Data>).transpose() {
                Ok(Some(result)) => {
                    debug!(%key, "cache hit");
                    response.set_source(FetchSource::Cache);
                    Flow::Complete(Ok(result))
                }
                Ok(None) if policy == CachePolicy::ReturnCacheDataDontFetch => {
                    Flow::Complete(Err(Error::CacheMiss { key }))
                }
                Ok(None) => {
                    debug!(%key, "cache miss");
                    Flow::Proceed
                }
                Err(error) if policy == CachePolicy::ReturnCacheDataDontFetch => {
                    Flow::Complete(Err(error))
                }
                Err(error) => {
                    warn!(%error, %key, "cached record does not match the operation, fetching");
                    Flow::Proceed
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::future::{self, Future};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};
    use graphwire_core::{CacheKey, Result};
    use serde_json::{Value, json};

    use super::*;

    #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
    struct HeroData {
        hero: Hero,
    }

    #[derive(Debug, Clone, PartialEq, serde::Deserialize)]
    struct Hero {
        name: String,
    }

    struct HeroOperation(OperationType);

    impl GraphQLOperation for HeroOperation {
        type Data = HeroData;
        type Variables = Value;

        fn operation_type(&self) -> OperationType {
            self.0
        }

        fn operation_name(&self) -> &str {
            "Hero"
        }

        fn query_document(&self) -> &str {
            "query Hero { hero { name } }"
        }
    }

    /// Store answering every read with the same record, or failing.
    #[derive(Default)]
    struct FixedStore {
        record: Option<CacheRecord>,
        failing: bool,
        reads: AtomicUsize,
    }

    impl FixedStore {
        fn holding(data: Value) -> Self {
            Self {
                record: Some(CacheRecord {
                    data,
                    dependent_keys: HashSet::from(["QUERY_ROOT.hero.name".to_string()]),
                }),
                ..Self::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl CacheStore for FixedStore {
        fn read(&self, _key: &str) -> impl Future<Output = Result<Option<CacheRecord>>> + Send {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let record = if self.failing {
                Err(Error::cache("store unavailable"))
            } else {
                Ok(self.record.clone())
            };
            future::ready(record)
        }

        fn write(
            &self,
            _key: CacheKey,
            _record: CacheRecord,
        ) -> impl Future<Output = Result<()>> + Send {
            future::ready(Ok(()))
        }
    }

    fn hero_record() -> Value {
        json!({ "hero": { "name": "R2-D2" } })
    }

    fn request(operation_type: OperationType, policy: CachePolicy) -> HttpRequest<HeroOperation> {
        let endpoint = url::Url::parse("https://api.example.com/graphql").expect("valid URL");
        HttpRequest::builder(HeroOperation(operation_type), endpoint)
            .cache_policy(policy)
            .build()
    }

    async fn run(
        store: &Arc<FixedStore>,
        request: &mut HttpRequest<HeroOperation>,
    ) -> (
        Flow<GraphQLResult<HeroData>>,
        HttpResponse<GraphQLResult<HeroData>>,
    ) {
        let stage = LegacyCacheReadInterceptor::new(Arc::clone(store));
        let context = ChainContext::new(1, Arc::new(Cancellation::new()));
        let mut response = HttpResponse::new();
        let flow = stage.intercept(&context, request, &mut response).await;
        (flow, response)
    }

    #[tokio::test]
    async fn hit_completes_from_the_cache() {
        let store = Arc::new(FixedStore::holding(hero_record()));

        for policy in [
            CachePolicy::ReturnCacheDataElseFetch,
            CachePolicy::ReturnCacheDataDontFetch,
        ] {
            let mut request = request(OperationType::Query, policy);
            let (flow, response) = run(&store, &mut request).await;

            let_assert!(Flow::Complete(Ok(result)) = flow);
            check!(result.source == ResultSource::Cache);
            check!(result.data.map(|data| data.hero.name).as_deref() == Some("R2-D2"));
            check!(
                result
                    .dependent_keys
                    .is_some_and(|keys| keys.contains("QUERY_ROOT.hero.name"))
            );
            check!(response.source() == FetchSource::Cache);
        }
    }

    #[tokio::test]
    async fn miss_proceeds_or_fails_by_policy() {
        let store = Arc::new(FixedStore::default());

        let mut request_else_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataElseFetch);
        let (flow, _) = run(&store, &mut request_else_fetch).await;
        check!(matches!(flow, Flow::Proceed));

        let mut request_dont_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataDontFetch);
        let expected_key = request_dont_fetch.operation().cache_key().expect("key");
        let (flow, _) = run(&store, &mut request_dont_fetch).await;
        let_assert!(Flow::Complete(Err(Error::CacheMiss { key })) = flow);
        check!(key == expected_key);
    }

    #[tokio::test]
    async fn fetch_policies_skip_the_store() {
        let store = Arc::new(FixedStore::holding(hero_record()));

        for policy in [
            CachePolicy::FetchIgnoringCacheData,
            CachePolicy::FetchIgnoringCacheCompletely,
        ] {
            let mut request = request(OperationType::Query, policy);
            let (flow, _) = run(&store, &mut request).await;
            check!(matches!(flow, Flow::Proceed), "{policy:?}");
        }
        check!(store.reads() == 0);
    }

    #[tokio::test]
    async fn mutations_and_subscriptions_skip_the_store() {
        let store = Arc::new(FixedStore::holding(hero_record()));

        for operation_type in [OperationType::Mutation, OperationType::Subscription] {
            let mut request = request(operation_type, CachePolicy::ReturnCacheDataDontFetch);
            let (flow, response) = run(&store, &mut request).await;
            check!(matches!(flow, Flow::Proceed), "{operation_type}");
            check!(response.source() == FetchSource::Network);
        }
        check!(store.reads() == 0);
    }

    #[tokio::test]
    async fn undecodable_record_fetches_or_fails_by_policy() {
        let store = Arc::new(FixedStore::holding(json!({ "hero": { "name": 42 } })));

        let mut request_else_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataElseFetch);
        let (flow, _) = run(&store, &mut request_else_fetch).await;
        check!(matches!(flow, Flow::Proceed));

        let mut request_dont_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataDontFetch);
        let (flow, _) = run(&store, &mut request_dont_fetch).await;
        let_assert!(Flow::Complete(Err(Error::JsonDeserialization { path, .. })) = flow);
        check!(path == "hero.name");
    }

    #[tokio::test]
    async fn failing_store_counts_as_a_miss() {
        let store = Arc::new(FixedStore {
            failing: true,
            ..FixedStore::holding(hero_record())
        });

        let mut request_else_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataElseFetch);
        let (flow, _) = run(&store, &mut request_else_fetch).await;
        check!(matches!(flow, Flow::Proceed));

        let mut request_dont_fetch =
            request(OperationType::Query, CachePolicy::ReturnCacheDataDontFetch);
        let (flow, _) = run(&store, &mut request_dont_fetch).await;
        let_assert!(Flow::Complete(Err(Error::CacheMiss { .. })) = flow);
        check!(store.reads() == 2);
    }

    #[tokio::test]
    async fn cancelled_stage_never_reads() {
        let store = Arc::new(FixedStore::holding(hero_record()));
        let stage = LegacyCacheReadInterceptor::new(Arc::clone(&store));
        Interceptor::<HeroOperation, GraphQLResult<HeroData>>::cancel(&stage);

        let context = ChainContext::new(1, Arc::new(Cancellation::new()));
        let mut request = request(OperationType::Query, CachePolicy::ReturnCacheDataElseFetch);
        let mut response = HttpResponse::new();
        let flow = stage.intercept(&context, &mut request, &mut response).await;

        check!(matches!(flow, Flow::Cancelled));
        check!(store.reads() == 0);
    }
}
