use crate::cache_api::ItemCache;
use crate::error::ErrorContext;
use crate::error::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Cache backed by a Redis server.
///
/// The connection manager reconnects on its own after a lost connection,
/// so a cache outage only fails the calls made while it lasts.
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    /// Connect to e.g. `redis://localhost:6379`.
    pub async fn connect(url: &str) -> Result<RedisCache> {
        let client = redis::Client::open(url).context(|| format!("Invalid Redis URL {}", url))?;
        let connection = ConnectionManager::new(client)
            .await
            .context(|| format!("Failed to connect to Redis at {}", url))?;
        Ok(RedisCache { connection })
    }
}

#[async_trait]
impl ItemCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        connection.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        connection.del::<_, ()>(key).await?;
        Ok(())
    }
}
