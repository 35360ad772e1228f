//! Shared engine on Redis (`SET .. EX`, `DEL`, `FLUSHDB`).

use std::time::Duration;

use async_trait::async_trait;
use redis::{Client, aio::MultiplexedConnection};
use tokio::time::timeout;
use tracing::{info, warn};

use super::{CacheError, ResponseCache};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed cache. The multiplexed connection is cloned per call.
#[derive(Clone)]
pub struct RedisResponseCache {
    conn: MultiplexedConnection,
}

impl RedisResponseCache {
    /// Connects to `url` (e.g. `redis://localhost:6379`) and checks it with `PING`.
    ///
    /// # Errors
    /// [`CacheError::Connection`] if the URL is invalid or the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Connection(format!("invalid redis url: {e}")))?;

        let mut conn = timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| CacheError::Connection("connect timed out".into()))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Connection(format!("ping failed: {e}")))?;
        if pong != "PONG" {
            return Err(CacheError::Connection(format!("unexpected ping reply: {pong}")));
        }

        info!("redis response cache connected");
        Ok(Self { conn })
    }
}

fn backend(op: &'static str, key: &str, e: redis::RedisError) -> CacheError {
    warn!(op, key, error = %e, "redis command failed");
    CacheError::Backend(format!("{op} failed: {e}"))
}

#[async_trait]
impl ResponseCache for RedisResponseCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| backend("GET", key, e))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // EX rejects 0; sub-second TTLs round up.
        let secs = ttl.as_secs().max(1);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(secs)
            .query_async(&mut conn)
            .await
            .map_err(|e| backend("SET", key, e))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| backend("DEL", key, e))?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(|e| backend("FLUSHDB", "*", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_url_is_a_connection_error() {
        let err = RedisResponseCache::connect("not-a-redis-url").await.err().unwrap();
        assert!(matches!(err, CacheError::Connection(_)));
    }
}
