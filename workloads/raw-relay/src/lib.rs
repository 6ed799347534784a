//! Spin component serving the raw content relay.
//!
//! Every inbound request goes through `Relay::handle`, backed by the Spin
//! Key-Value store and Spin outbound HTTP. One metrics line is written to
//! stderr per request.

#![cfg(target_arch = "wasm32")]

use async_trait::async_trait;
use spin_sdk::http::{IntoResponse, Method, Request, Response};
use spin_sdk::http_component;

use relay_sdk::relay_cache::{
    CacheError, CacheKey, CacheResult, CachedResponse, KvCache, ResponseCache,
};
use relay_sdk::relay_core::{RelayConfig, RequestContext};
use relay_sdk::relay_data::SpinOriginClient;
use relay_sdk::relay_observability::StructuredLogger;
use relay_sdk::{Relay, RelayResponse};

const WORKLOAD: &str = "raw-relay";

/// Header Spin sets to the full inbound URL.
const FULL_URL_HEADER: &str = "spin-full-url";

/// Key-Value store that may have failed to open.
///
/// A store that cannot be opened reports errors on every call, which the relay
/// treats as misses and ignored writes.
struct WorkloadCache(Result<KvCache, String>);

#[async_trait(?Send)]
impl ResponseCache for WorkloadCache {
    async fn get(&self, key: &CacheKey) -> CacheResult<Option<CachedResponse>> {
        match &self.0 {
            Ok(store) => store.get(key).await,
            Err(e) => Err(CacheError::Open(e.clone())),
        }
    }

    async fn put(&self, key: &CacheKey, response: CachedResponse) -> CacheResult<()> {
        match &self.0 {
            Ok(store) => store.put(key, response).await,
            Err(e) => Err(CacheError::Open(e.clone())),
        }
    }
}

/// Main HTTP handler.
#[http_component]
async fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
    let config = RelayConfig::default();

    let url = full_url(&req);
    let mut ctx = match RequestContext::parse(&method_name(req.method()), &url) {
        Ok(ctx) => ctx,
        Err(e) => {
            return Ok(Response::builder()
                .status(400)
                .header("content-type", "text/plain; charset=utf-8")
                .body(format!("bad request: {}", e))
                .build());
        }
    };
    ctx = ctx.with_headers(
        req.headers()
            .filter_map(|(k, v)| v.as_str().map(|v| (k.to_string(), v.to_string()))),
    );

    let logger = StructuredLogger::from_config(ctx.request_id.clone(), &config.logging)
        .with_workload(WORKLOAD);

    let cache = WorkloadCache(KvCache::open(&config.cache.store).map_err(|e| e.to_string()));
    if let Err(e) = &cache.0 {
        logger
            .error_builder("failed to open key-value store")
            .field("store", config.cache.store.as_str())
            .field("error", e.as_str())
            .emit();
    }

    let relay = Relay::new(config, cache, SpinOriginClient::new()).with_workload(WORKLOAD);
    let outcome = relay.handle(&mut ctx).await;

    eprintln!("{}", outcome.metrics.to_json());

    Ok(into_spin_response(outcome.response))
}

fn into_spin_response(response: RelayResponse) -> Response {
    let mut builder = Response::builder();
    builder.status(response.status.as_u16());
    for (name, value) in response.headers.iter() {
        builder.header(name, value);
    }
    builder.body(response.body.to_vec()).build()
}

/// Absolute inbound URL.
fn full_url(req: &Request) -> String {
    if let Some(url) = req.header(FULL_URL_HEADER).and_then(|v| v.as_str()) {
        return url.to_string();
    }
    let host = req
        .header("host")
        .and_then(|v| v.as_str())
        .unwrap_or("localhost");
    format!("http://{}{}", host, req.path_and_query().unwrap_or("/"))
}

fn method_name(method: &Method) -> String {
    match method {
        Method::Get => "GET".to_string(),
        Method::Head => "HEAD".to_string(),
        Method::Post => "POST".to_string(),
        Method::Put => "PUT".to_string(),
        Method::Delete => "DELETE".to_string(),
        Method::Connect => "CONNECT".to_string(),
        Method::Options => "OPTIONS".to_string(),
        Method::Trace => "TRACE".to_string(),
        Method::Patch => "PATCH".to_string(),
        Method::Other(other) => other.clone(),
    }
}
