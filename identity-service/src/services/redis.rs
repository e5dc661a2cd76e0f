use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client, Script};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Result of an atomic compare-and-delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TakeOutcome {
    /// Value matched and the key was removed.
    Taken,
    /// Key exists with a different value; left in place.
    Mismatch,
    /// Value did not match and the attempt budget is spent; the key was removed.
    Exhausted,
    /// No live key.
    Missing,
}

/// Key/value cache with per-key expiry, holding one-time codes.
#[async_trait]
pub trait OtpCache: Send + Sync {
    /// Store `value` under `key`, resetting its failed-attempt count.
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error>;
    /// Delete `key` only if it currently holds `expected`, as one atomic step.
    /// The `max_attempts`-th mismatch deletes the key.
    async fn take_if_equals(
        &self,
        key: &str,
        expected: &str,
        max_attempts: u32,
    ) -> Result<TakeOutcome, anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

const TAKE_IF_EQUALS: &str = r#"
local current = redis.call('HGET', KEYS[1], 'value')
if not current then
  return 0
end
if current == ARGV[1] then
  redis.call('DEL', KEYS[1])
  return 1
end
local attempts = redis.call('HINCRBY', KEYS[1], 'attempts', 1)
if attempts >= tonumber(ARGV[2]) then
  redis.call('DEL', KEYS[1])
  return -2
end
return -1
"#;

#[derive(Clone)]
pub struct RedisService {
    manager: ConnectionManager,
    take_script: Script,
}

impl RedisService {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!("Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // ConnectionManager reconnects on its own after transient failures
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            manager,
            take_script: Script::new(TAKE_IF_EQUALS),
        })
    }
}

#[async_trait]
impl OtpCache for RedisService {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::pipe()
            .atomic()
            .cmd("DEL")
            .arg(key)
            .ignore()
            .cmd("HSET")
            .arg(key)
            .arg("value")
            .arg(value)
            .arg("attempts")
            .arg(0)
            .ignore()
            .cmd("EXPIRE")
            .arg(key)
            .arg(expiry_seconds)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to set cache: {}", e))
    }

    async fn take_if_equals(
        &self,
        key: &str,
        expected: &str,
        max_attempts: u32,
    ) -> Result<TakeOutcome, anyhow::Error> {
        let mut conn = self.manager.clone();
        let outcome: i64 = self
            .take_script
            .key(key)
            .arg(expected)
            .arg(max_attempts)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to consume cache entry: {}", e))?;

        Ok(match outcome {
            1 => TakeOutcome::Taken,
            0 => TakeOutcome::Missing,
            -2 => TakeOutcome::Exhausted,
            _ => TakeOutcome::Mismatch,
        })
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}

/// In-process cache honouring expiry, for tests and local runs.
#[derive(Default)]
pub struct MockOtpCache {
    entries: Mutex<HashMap<String, MockEntry>>,
}

struct MockEntry {
    value: String,
    attempts: u32,
    deadline: Instant,
}

impl MockOtpCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, MockEntry>>, anyhow::Error> {
        self.entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock cache mutex poisoned: {}", e))
    }
}

#[async_trait]
impl OtpCache for MockOtpCache {
    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), anyhow::Error> {
        let entry = MockEntry {
            value: value.to_string(),
            attempts: 0,
            deadline: Instant::now() + Duration::from_secs(expiry_seconds),
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn take_if_equals(
        &self,
        key: &str,
        expected: &str,
        max_attempts: u32,
    ) -> Result<TakeOutcome, anyhow::Error> {
        let mut entries = self.lock()?;

        let Some(entry) = entries.get_mut(key) else {
            return Ok(TakeOutcome::Missing);
        };
        if Instant::now() >= entry.deadline {
            entries.remove(key);
            return Ok(TakeOutcome::Missing);
        }
        if entry.value == expected {
            entries.remove(key);
            return Ok(TakeOutcome::Taken);
        }

        entry.attempts += 1;
        if entry.attempts >= max_attempts {
            entries.remove(key);
            return Ok(TakeOutcome::Exhausted);
        }
        Ok(TakeOutcome::Mismatch)
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_expires_entries() {
        let cache = MockOtpCache::new();
        cache.set_with_expiry("k", "v", 0).await.unwrap();
        assert_eq!(
            cache.take_if_equals("k", "v", 5).await.unwrap(),
            TakeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn mock_take_keeps_entry_on_mismatch() {
        let cache = MockOtpCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();

        assert_eq!(
            cache.take_if_equals("k", "other", 5).await.unwrap(),
            TakeOutcome::Mismatch
        );
        assert_eq!(
            cache.take_if_equals("k", "v", 5).await.unwrap(),
            TakeOutcome::Taken
        );
        assert_eq!(
            cache.take_if_equals("k", "v", 5).await.unwrap(),
            TakeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn mock_burns_entry_after_attempt_budget() {
        let cache = MockOtpCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();

        for _ in 0..2 {
            assert_eq!(
                cache.take_if_equals("k", "x", 3).await.unwrap(),
                TakeOutcome::Mismatch
            );
        }
        assert_eq!(
            cache.take_if_equals("k", "x", 3).await.unwrap(),
            TakeOutcome::Exhausted
        );
        assert_eq!(
            cache.take_if_equals("k", "v", 3).await.unwrap(),
            TakeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn mock_reset_clears_attempts() {
        let cache = MockOtpCache::new();
        cache.set_with_expiry("k", "v", 60).await.unwrap();
        cache.take_if_equals("k", "x", 2).await.unwrap();
        cache.set_with_expiry("k", "v", 60).await.unwrap();

        assert_eq!(
            cache.take_if_equals("k", "x", 2).await.unwrap(),
            TakeOutcome::Mismatch
        );
    }
}
