//! The relay pipeline.

use relay_cache::{
    lookup, CacheKey, CacheKeyBuilder, CacheStatus, RequestIdentity, ResponseCache,
    RouteCachePolicy,
};
use relay_core::{
    decode_path, LifecycleObserver, LifecyclePhase, RelayConfig, RelayError, RequestContext,
};
use relay_data::{origin_request, OriginClient};
use relay_observability::{MetricsCollector, RequestMetrics, StructuredLogger};

use crate::response::RelayResponse;

/// Timing mark around the cache lookup.
pub const MARK_CACHE_LOOKUP: &str = "cache_lookup";
/// Timing mark around the origin fetch.
pub const MARK_ORIGIN_FETCH: &str = "origin_fetch";
/// Timing mark around the cache write.
pub const MARK_CACHE_STORE: &str = "cache_store";

const DEFAULT_WORKLOAD: &str = "raw-relay";

/// Result of relaying one request.
#[derive(Debug)]
pub struct RelayOutcome {
    /// Response for the client.
    pub response: RelayResponse,
    /// Cache lookup outcome.
    pub cache_status: CacheStatus,
    /// Metrics record for the request.
    pub metrics: RequestMetrics,
}

/// Raw content relay over a response cache and an origin client.
///
/// Each call to [`Relay::handle`] is independent; concurrent misses for the
/// same key each fetch and the last store wins.
pub struct Relay<C, O> {
    config: RelayConfig,
    policy: RouteCachePolicy,
    keys: CacheKeyBuilder,
    workload: String,
    cache: C,
    origin: O,
}

impl<C: ResponseCache, O: OriginClient> Relay<C, O> {
    /// Create a relay. Content is cached as public and immutable for one year.
    pub fn new(config: RelayConfig, cache: C, origin: O) -> Self {
        let keys = CacheKeyBuilder::new().with_prefix(config.cache.key_prefix.clone());
        Self {
            config,
            policy: RouteCachePolicy::immutable_public(RouteCachePolicy::ONE_YEAR),
            keys,
            workload: DEFAULT_WORKLOAD.to_string(),
            cache,
            origin,
        }
    }

    /// Set the workload name used in logs and metrics.
    pub fn with_workload(mut self, workload: impl Into<String>) -> Self {
        self.workload = workload.into();
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// The response cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The origin client.
    pub fn origin(&self) -> &O {
        &self.origin
    }

    /// Cache key for a request.
    pub fn cache_key(&self, ctx: &RequestContext) -> CacheKey {
        self.keys
            .build(&RequestIdentity::new(&ctx.method, &ctx.url))
    }

    /// Relay one request. Never fails; errors become client responses.
    pub async fn handle(&self, ctx: &mut RequestContext) -> RelayOutcome {
        let logger = StructuredLogger::from_config(ctx.request_id.clone(), &self.config.logging)
            .with_workload(&self.workload);
        let mut metrics = MetricsCollector::new(ctx.request_id.clone());
        metrics.set_workload(&self.workload);
        logger.on_phase(LifecyclePhase::Start, ctx.timing.elapsed());

        let key = self.cache_key(ctx);

        ctx.timing.begin(MARK_CACHE_LOOKUP);
        let found = lookup(&self.cache, &key).await;
        ctx.timing.end(MARK_CACHE_LOOKUP);

        let cache_status = found.status;
        metrics.record_cache_status(cache_status);
        if let Some(err) = &found.error {
            logger
                .warn_builder("cache lookup failed")
                .field("cache_key", key.as_str())
                .field("error", err.as_str())
                .emit();
        }
        logger.on_phase(LifecyclePhase::CacheLookup, ctx.timing.elapsed());

        let response = match found.response {
            Some(cached) => RelayResponse::from_cached(cached),
            None => match self.relay_miss(ctx, &key, &logger, &mut metrics).await {
                Ok(response) => response,
                Err(err) => {
                    metrics.record_error(err.kind());
                    logger.on_phase(LifecyclePhase::Error(err.kind().to_string()), ctx.timing.elapsed());
                    logger
                        .warn_builder("relay failed")
                        .field("cache_key", key.as_str())
                        .field("error", err.to_string())
                        .field_u64("status", u64::from(err.status_code().as_u16()))
                        .emit();
                    RelayResponse::from_error(&err)
                }
            },
        };

        logger.on_phase(LifecyclePhase::Completion, ctx.timing.elapsed());
        logger
            .info_builder("request complete")
            .field("cache_key", key.as_str())
            .field("cache_status", cache_status.to_string())
            .field_u64("status", u64::from(response.status.as_u16()))
            .field_u64("bytes", response.body.len() as u64)
            .emit();

        let metrics = metrics.finalize(Some(response.status.as_u16()), Some(response.body.len()));
        RelayOutcome {
            response,
            cache_status,
            metrics,
        }
    }

    async fn relay_miss(
        &self,
        ctx: &mut RequestContext,
        key: &CacheKey,
        logger: &StructuredLogger,
        metrics: &mut MetricsCollector,
    ) -> Result<RelayResponse, RelayError> {
        let route = decode_path(ctx.path())?;
        logger.on_phase(LifecyclePhase::Decoded, ctx.timing.elapsed());

        ctx.timing.begin(MARK_ORIGIN_FETCH);
        let fetched = self
            .origin
            .fetch(origin_request(&self.config.origin, &route))
            .await;
        ctx.timing.end(MARK_ORIGIN_FETCH);
        let fetch_time = ctx.timing.phase(MARK_ORIGIN_FETCH).unwrap_or_default();

        let origin = match fetched {
            Ok(origin) => origin,
            Err(err) => {
                metrics.record_origin_failure(fetch_time, err.to_string());
                return Err(RelayError::OriginUnreachable(err.to_string()));
            }
        };
        metrics.record_origin(fetch_time, origin.status.as_u16(), origin.body.len());
        logger.on_phase(LifecyclePhase::OriginFetched, ctx.timing.elapsed());

        if !origin.is_success() {
            return Err(RelayError::OriginRejected {
                status: origin.status,
            });
        }

        let response = RelayResponse::from_origin(origin, &self.policy);

        ctx.timing.begin(MARK_CACHE_STORE);
        let stored = self.cache.put(key, response.to_cached(&self.policy)).await;
        ctx.timing.end(MARK_CACHE_STORE);

        match stored {
            Ok(()) => logger.on_phase(LifecyclePhase::Stored, ctx.timing.elapsed()),
            Err(err) => {
                metrics.record_store_failure();
                logger
                    .warn_builder("cache store failed")
                    .field("cache_key", key.as_str())
                    .field("error", err.to_string())
                    .emit();
            }
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use bytes::Bytes;
    use http::StatusCode;
    use relay_cache::{CacheError, CacheResult, CachedResponse, InMemoryCache, ResponseHeaders};
    use relay_core::{byte_string, encode_path};
    use relay_data::{FetchError, OriginRequest, OriginResponse};

    use super::*;

    enum Reply {
        Ok(StatusCode, &'static str),
        Fail,
    }

    struct MockOrigin {
        calls: Arc<AtomicUsize>,
        reply: Reply,
        seen: RefCell<Vec<OriginRequest>>,
    }

    impl MockOrigin {
        fn new(reply: Reply) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let origin = Self {
                calls: Arc::clone(&calls),
                reply,
                seen: RefCell::new(Vec::new()),
            };
            (origin, calls)
        }
    }

    #[async_trait(?Send)]
    impl OriginClient for MockOrigin {
        async fn fetch(&self, request: OriginRequest) -> Result<OriginResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.borrow_mut().push(request);
            match &self.reply {
                Reply::Ok(status, body) => Ok(OriginResponse::new(
                    *status,
                    vec![(
                        "content-type".to_string(),
                        "text/plain; charset=utf-8".to_string(),
                    )],
                    *body,
                )),
                Reply::Fail => Err(FetchError::Connection("connection refused".into())),
            }
        }
    }

    struct ReadOnlyCache;

    #[async_trait(?Send)]
    impl ResponseCache for ReadOnlyCache {
        async fn get(&self, _key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
            Ok(None)
        }

        async fn put(&self, _key: &CacheKey, _response: CachedResponse) -> CacheResult<()> {
            Err(CacheError::Storage("read-only".into()))
        }
    }

    struct BrokenCache;

    #[async_trait(?Send)]
    impl ResponseCache for BrokenCache {
        async fn get(&self, _key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
            Err(CacheError::Storage("unavailable".into()))
        }

        async fn put(&self, _key: &CacheKey, _response: CachedResponse) -> CacheResult<()> {
            Err(CacheError::Storage("unavailable".into()))
        }
    }

    fn quiet_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.logging.level = "error".to_string();
        config
    }

    fn relay<C: ResponseCache>(cache: C, reply: Reply) -> (Relay<C, MockOrigin>, Arc<AtomicUsize>) {
        let (origin, calls) = MockOrigin::new(reply);
        (Relay::new(quiet_config(), cache, origin), calls)
    }

    fn valid_path() -> String {
        encode_path("sometoken1234", "owner/repo", "path/to/file.txt")
    }

    fn ctx(path: &str) -> RequestContext {
        RequestContext::parse("GET", &format!("https://relay.example{}", path)).unwrap()
    }

    #[tokio::test]
    async fn test_round_trip_and_repeat_is_cached() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));

        let first = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(first.cache_status, CacheStatus::Miss);
        assert_eq!(first.response.status, StatusCode::OK);
        assert_eq!(first.response.body, Bytes::from_static(b"hello"));
        assert_eq!(
            first.response.header("Cache-Control"),
            Some("public, max-age=31536000, immutable")
        );
        assert_eq!(first.response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(first.response.header("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(
            first.response.header("content-type"),
            Some("text/plain; charset=utf-8")
        );

        let second = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(second.cache_status, CacheStatus::Hit);
        assert_eq!(second.response, first.response);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_origin_request_shape() {
        let (relay, _calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));
        relay.handle(&mut ctx(&valid_path())).await;

        let seen = relay.origin().seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0].url(),
            "https://raw.githubusercontent.com/owner/repo/main/path/to/file.txt"
        );
        assert_eq!(
            seen[0].header_value("authorization"),
            Some("Bearer sometoken1234")
        );
        assert_eq!(
            seen[0].header_value("accept"),
            Some("application/vnd.github.v3.raw")
        );
    }

    #[tokio::test]
    async fn test_non_utf8_credential_is_forwarded() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));

        // credential bytes "token\xe91234"
        let outcome = relay
            .handle(&mut ctx("/dG9rZW7pMTIzNA==/b3duZXIvcmVwbw==/f.txt"))
            .await;
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let seen = relay.origin().seen.borrow();
        let authorization = seen[0].header_value("authorization").unwrap();
        assert_eq!(byte_string(authorization), b"Bearer token\xe91234");
    }

    #[tokio::test]
    async fn test_cache_hit_served_without_fetch() {
        let cache = InMemoryCache::new();
        let (relay, calls) = relay(cache, Reply::Fail);

        let mut request = ctx("/anything/at/all");
        let key = relay.cache_key(&request);
        let stored = CachedResponse::new(
            StatusCode::OK,
            ResponseHeaders::from_iter(vec![("x-stored".to_string(), "yes".to_string())]),
            Bytes::from_static(b"stored body"),
            RouteCachePolicy::ONE_YEAR,
        );
        relay.cache().put(&key, stored).await.unwrap();

        let outcome = relay.handle(&mut request).await;
        assert_eq!(outcome.cache_status, CacheStatus::Hit);
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(outcome.response.body_text(), "stored body");
        assert_eq!(outcome.response.header("x-stored"), Some("yes"));
        assert_eq!(outcome.response.header("cache-control"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_too_few_segments() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "x"));
        for path in ["/", "/only", "/c2VjcmV0dG9rZW4x/b3duZXIvcmVwbw", "//a//b//"] {
            let outcome = relay.handle(&mut ctx(path)).await;
            assert_eq!(outcome.response.status, StatusCode::BAD_REQUEST, "{}", path);
            assert_eq!(outcome.response.body_text(), "invalid URL");
            assert_eq!(
                outcome.response.header("content-type"),
                Some("text/plain; charset=utf-8")
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_segment() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "x"));

        let short_credential = relay.handle(&mut ctx("/YWJjZGVmZ2/b3duZXIvcmVwbw/f.txt")).await;
        assert_eq!(short_credential.response.status, StatusCode::BAD_REQUEST);
        assert_eq!(short_credential.response.body_text(), "invalid URL");

        let short_coordinate = relay.handle(&mut ctx("/c29tZXRva2VuMTIzNA/b3duZXI/f.txt")).await;
        assert_eq!(short_coordinate.response.status, StatusCode::BAD_REQUEST);
        assert_eq!(short_coordinate.response.body_text(), "invalid URL");

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_base64() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "x"));

        let outcome = relay.handle(&mut ctx("/!!!notbase64!!!/b3duZXIvcmVwbw/f.txt")).await;
        assert_eq!(outcome.response.status, StatusCode::BAD_REQUEST);
        assert_eq!(outcome.response.body_text(), "invalid token or repo");
        assert_eq!(outcome.metrics.error_kind.as_deref(), Some("decode_failure"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_origin_not_found_is_not_cached() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::NOT_FOUND, "404: Not Found"));

        let first = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(first.response.status, StatusCode::NOT_FOUND);
        assert_eq!(first.response.body_text(), "could not fetch content");
        assert_eq!(first.response.header("cache-control"), None);
        assert!(relay.cache().is_empty());

        let second = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(second.cache_status, CacheStatus::Miss);
        assert_eq!(second.response.status, StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transport_failure_is_500_and_not_cached() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Fail);

        let outcome = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(outcome.response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(outcome.response.body_text(), "error connecting to origin");
        assert!(!outcome.response.body_text().contains("refused"));
        assert!(relay.cache().is_empty());
        assert_eq!(outcome.metrics.error_kind.as_deref(), Some("origin_unreachable"));
        assert_eq!(outcome.metrics.origin.as_ref().and_then(|o| o.status_code), None);

        relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_repeated_requests_fetch_once() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));

        let mut bodies = Vec::new();
        for _ in 0..5 {
            let outcome = relay.handle(&mut ctx(&valid_path())).await;
            bodies.push(outcome.response);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(bodies.iter().all(|r| *r == bodies[0]));
        assert_eq!(relay.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_does_not_affect_response() {
        let (relay, calls) = relay(ReadOnlyCache, Reply::Ok(StatusCode::OK, "hello"));

        let outcome = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(outcome.response.body_text(), "hello");
        assert!(outcome.metrics.cache_store_failed);

        relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_failure_is_a_miss() {
        let (relay, calls) = relay(BrokenCache, Reply::Ok(StatusCode::OK, "hello"));

        let outcome = relay.handle(&mut ctx(&valid_path())).await;
        assert_eq!(outcome.cache_status, CacheStatus::Error);
        assert_eq!(outcome.response.status, StatusCode::OK);
        assert_eq!(outcome.metrics.cache_status.as_deref(), Some("ERROR"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_method_participates_in_key() {
        let (relay, calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));
        let url = format!("https://relay.example{}", valid_path());

        relay.handle(&mut RequestContext::parse("GET", &url).unwrap()).await;
        let head = relay.handle(&mut RequestContext::parse("HEAD", &url).unwrap()).await;

        assert_eq!(head.cache_status, CacheStatus::Miss);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timing_marks_recorded() {
        let (relay, _calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));
        let mut request = ctx(&valid_path());
        relay.handle(&mut request).await;

        assert!(request.timing.phase(MARK_CACHE_LOOKUP).is_some());
        assert!(request.timing.phase(MARK_ORIGIN_FETCH).is_some());
        assert!(request.timing.phase(MARK_CACHE_STORE).is_some());
    }

    #[tokio::test]
    async fn test_metrics_for_success() {
        let (relay, _calls) = relay(InMemoryCache::new(), Reply::Ok(StatusCode::OK, "hello"));
        let outcome = relay.handle(&mut ctx(&valid_path())).await;

        let metrics = outcome.metrics;
        assert_eq!(metrics.status_code, Some(200));
        assert_eq!(metrics.cache_status.as_deref(), Some("MISS"));
        assert_eq!(metrics.response_bytes, Some(5));
        assert_eq!(metrics.workload.as_deref(), Some("raw-relay"));
        assert!(!metrics.cache_store_failed);
        assert!(metrics.origin.unwrap().success());
    }
}
