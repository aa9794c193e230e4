use crate::cache_redis::RedisCache;
use crate::command_line_interface::CliOptions;
use crate::error::Result;
use async_trait::async_trait;
use log::debug;
use log::info;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::RwLock;

/// Key-value cache in front of the document store.
/// Values are JSON documents, keyed by item id.
#[async_trait]
pub trait ItemCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Deleting a key that is not cached is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// `false` for caches that never store anything.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// What the cache holds for an item after it was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheUpdatePolicy {
    /// Only the fields of the update request plus `updated_at`.
    Payload,
    /// The full document as stored after the update.
    Merged,
    /// Nothing, the entry is removed and refilled by the next read.
    Invalidate,
}

impl CacheUpdatePolicy {
    pub const VARIANTS: [&'static str; 3] = ["payload", "merged", "invalidate"];
}

impl Default for CacheUpdatePolicy {
    fn default() -> Self {
        CacheUpdatePolicy::Payload
    }
}

impl FromStr for CacheUpdatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "payload" => Ok(CacheUpdatePolicy::Payload),
            "merged" => Ok(CacheUpdatePolicy::Merged),
            "invalidate" => Ok(CacheUpdatePolicy::Invalidate),
            _ => Err(format!(
                "unknown cache update policy '{}', expected one of {:?}",
                s,
                CacheUpdatePolicy::VARIANTS
            )),
        }
    }
}

impl fmt::Display for CacheUpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CacheUpdatePolicy::Payload => "payload",
            CacheUpdatePolicy::Merged => "merged",
            CacheUpdatePolicy::Invalidate => "invalidate",
        };
        f.write_str(name)
    }
}

/// Cache used when no cache server is configured.
pub struct NoCache;

#[async_trait]
impl ItemCache for NoCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Process-local cache, mostly useful for tests and single-instance setups.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ItemCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write()?.remove(key);
        Ok(())
    }
}

/// Connect to the cache selected on the command line, or disable caching.
pub async fn connect_cache(cli_options: &CliOptions) -> Result<Arc<dyn ItemCache>> {
    match &cli_options.redis_url {
        Some(url) => {
            info!(
                "Using Redis cache at {}, update policy {}",
                url, cli_options.cache_update_policy
            );
            Ok(Arc::new(RedisCache::connect(url).await?))
        }
        None => {
            debug!("No Redis URL configured, caching disabled");
            Ok(Arc::new(NoCache))
        }
    }
}
