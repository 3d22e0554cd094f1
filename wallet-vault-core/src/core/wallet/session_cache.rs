//! Session cache of unlocked keyrings
//!
//! A lookup never decrypts anything. With the default policy entries live
//! until they are invalidated; an idle timeout and a capacity can be set.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use crate::core::crypto::Keyring;
use crate::domain::entities::WalletHandle;
use crate::shared::types::{Address, WalletNumber};

/// Expiry and capacity rules for the session cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Drop entries not touched for this long
    pub idle_timeout: Option<Duration>,
    /// Evict the least recently used entry beyond this many
    pub max_entries: Option<usize>,
}

impl SessionPolicy {
    pub fn new(idle_timeout: Option<Duration>, max_entries: Option<usize>) -> Self {
        Self {
            idle_timeout,
            max_entries,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionCacheEntry {
    pub address: Address,
    pub keyring: Arc<Keyring>,
    pub wallet_number: Option<WalletNumber>,
    pub created_at: Instant,
    pub last_accessed: Instant,
}

impl SessionCacheEntry {
    pub fn handle(&self) -> WalletHandle {
        WalletHandle::new(Arc::clone(&self.keyring), self.wallet_number)
    }

    fn is_expired(&self, policy: &SessionPolicy, now: Instant) -> bool {
        match policy.idle_timeout {
            Some(timeout) => now.duration_since(self.last_accessed) > timeout,
            None => false,
        }
    }
}

pub struct SessionCache {
    entries: RwLock<LruCache<Address, SessionCacheEntry>>,
    policy: SessionPolicy,
}

impl SessionCache {
    pub fn new(policy: SessionPolicy) -> Self {
        let entries = match policy.max_entries.and_then(|max| NonZeroUsize::new(max.max(1))) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };
        Self {
            entries: RwLock::new(entries),
            policy,
        }
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Insert or overwrite the entry for `address`
    pub async fn put(&self, address: &str, keyring: Arc<Keyring>, wallet_number: Option<WalletNumber>) {
        let now = Instant::now();
        let entry = SessionCacheEntry {
            address: address.to_string(),
            keyring,
            wallet_number,
            created_at: now,
            last_accessed: now,
        };

        let evicted = self.entries.write().await.push(address.to_string(), entry);
        if let Some((evicted, _)) = evicted {
            if evicted != address {
                log::debug!("Session cache full, evicted {}", evicted);
            }
        }
    }

    /// Look up an entry and mark it as most recently used. Expired entries are dropped and reported as a miss.
    pub async fn get(&self, address: &str) -> Option<SessionCacheEntry> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let expired = entries.peek(address)?.is_expired(&self.policy, now);
        if expired {
            log::debug!("Session for {} expired", address);
            entries.pop(address);
            return None;
        }

        let entry = entries.get_mut(address)?;
        entry.last_accessed = now;
        Some(entry.clone())
    }

    pub async fn contains(&self, address: &str) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .peek(address)
            .map(|entry| !entry.is_expired(&self.policy, now))
            .unwrap_or(false)
    }

    /// Remove an entry; returns whether one was present
    pub async fn invalidate(&self, address: &str) -> bool {
        self.entries.write().await.pop(address).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyring() -> Arc<Keyring> {
        Arc::new(Keyring::generate().expect("Failed to generate keyring"))
    }

    #[tokio::test]
    async fn test_put_get_invalidate() {
        let cache = SessionCache::default();
        let keyring = keyring();
        let address = keyring.address().to_string();

        assert!(cache.get(&address).await.is_none());
        cache.put(&address, Arc::clone(&keyring), Some(1)).await;

        let entry = cache.get(&address).await.expect("Expected cache hit");
        assert!(Arc::ptr_eq(&entry.keyring, &keyring));
        assert_eq!(entry.wallet_number, Some(1));
        assert_eq!(entry.handle().address(), address);

        assert!(cache.invalidate(&address).await);
        assert!(!cache.invalidate(&address).await);
        assert!(cache.get(&address).await.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let cache = SessionCache::default();
        let keyring = keyring();
        let address = keyring.address().to_string();

        cache.put(&address, Arc::clone(&keyring), None).await;
        cache.put(&address, Arc::clone(&keyring), Some(4)).await;

        assert_eq!(cache.len().await, 1);
        let entry = cache.get(&address).await.expect("Expected cache hit");
        assert_eq!(entry.wallet_number, Some(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_never_expires() {
        let cache = SessionCache::default();
        let keyring = keyring();
        let address = keyring.address().to_string();
        cache.put(&address, keyring, None).await;

        tokio::time::advance(Duration::from_secs(60 * 60 * 24 * 365)).await;
        assert!(cache.get(&address).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout() {
        let cache = SessionCache::new(SessionPolicy::new(Some(Duration::from_secs(60)), None));
        let keyring = keyring();
        let address = keyring.address().to_string();
        cache.put(&address, keyring, None).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(cache.get(&address).await.is_some());

        // The lookup above refreshed the entry
        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(cache.contains(&address).await);

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(!cache.contains(&address).await);
        assert!(cache.get(&address).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = SessionCache::new(SessionPolicy::new(None, Some(2)));
        let (a, b, c) = (keyring(), keyring(), keyring());

        cache.put(a.address(), Arc::clone(&a), None).await;
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.put(b.address(), Arc::clone(&b), None).await;
        tokio::time::advance(Duration::from_millis(10)).await;

        // Touch "a" so "b" becomes the oldest
        assert!(cache.get(a.address()).await.is_some());
        tokio::time::advance(Duration::from_millis(10)).await;
        cache.put(c.address(), Arc::clone(&c), None).await;

        assert_eq!(cache.len().await, 2);
        assert!(cache.contains(a.address()).await);
        assert!(!cache.contains(b.address()).await);
        assert!(cache.contains(c.address()).await);
    }

    #[tokio::test]
    async fn test_zero_capacity_keeps_latest_entry() {
        let cache = SessionCache::new(SessionPolicy::new(None, Some(0)));
        let (a, b) = (keyring(), keyring());
        cache.put(a.address(), Arc::clone(&a), None).await;
        cache.put(b.address(), Arc::clone(&b), None).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.contains(b.address()).await);
    }

    #[tokio::test]
    async fn test_unbounded_by_default() {
        let cache = SessionCache::default();
        for _ in 0..16 {
            let keyring = keyring();
            cache.put(keyring.address(), Arc::clone(&keyring), None).await;
        }
        assert_eq!(cache.len().await, 16);
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = SessionCache::default();
        let (a, b) = (keyring(), keyring());
        cache.put(a.address(), a.clone(), None).await;
        cache.put(b.address(), b.clone(), None).await;

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
