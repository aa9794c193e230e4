extern crate items_pod;

use bytes::Bytes;
use items_pod::cache_api::CacheUpdatePolicy;
use items_pod::cache_api::ItemCache;
use items_pod::cache_api::MemoryCache;
use items_pod::cache_api::NoCache;
use items_pod::database_sqlite::SqliteStore;
use items_pod::internal_api::ItemsApi;
use serde_json::Value;
use std::sync::Arc;
use warp::http::Response;

/// Service over a fresh in-memory store, without a cache.
#[allow(dead_code)]
pub fn api_without_cache() -> Arc<ItemsApi> {
    let store = SqliteStore::open_in_memory("test-collection").unwrap();
    Arc::new(ItemsApi::new(
        Arc::new(store),
        Arc::new(NoCache),
        CacheUpdatePolicy::Payload,
    ))
}

/// Service over a fresh in-memory store, with a cache the test can inspect.
#[allow(dead_code)]
pub fn api_with_cache(policy: CacheUpdatePolicy) -> (Arc<ItemsApi>, Arc<MemoryCache>) {
    let store = SqliteStore::open_in_memory("test-collection").unwrap();
    let cache = Arc::new(MemoryCache::new());
    let api = ItemsApi::new(Arc::new(store), cache.clone(), policy);
    (Arc::new(api), cache)
}

#[allow(dead_code)]
pub fn body_json(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).expect("Response body is not JSON")
}

#[allow(dead_code)]
pub async fn cached_json(cache: &MemoryCache, id: &str) -> Option<Value> {
    let cached = cache.get(id).await.unwrap()?;
    Some(serde_json::from_str(&cached).unwrap())
}
