//! Response cache: key derivation plus pluggable storage engines.
//!
//! The orchestrator only sees [`ResponseCache`]; engines are picked at wiring
//! time ([`moka::MokaResponseCache`] in-process, [`redis::RedisResponseCache`]
//! shared).

pub mod key;
pub mod moka;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use key::{CACHE_KEY_PREFIX, cache_key};

#[derive(Debug, Error)]
pub enum CacheError {
    /// Storage engine rejected or failed the operation.
    #[error("[Cache] backend error: {0}")]
    Backend(String),

    /// Could not reach the storage engine.
    #[error("[Cache] connection error: {0}")]
    Connection(String),
}

/// Opaque byte store with per-entry time-to-live.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores `value`, replacing any entry under `key`.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Drops every entry.
    async fn flush(&self) -> Result<(), CacheError>;
}
