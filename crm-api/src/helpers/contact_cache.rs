use chrono::{DateTime, Duration, Utc};
use shared_types::Contact;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_TTL_SECONDS: i64 = 300;

#[derive(Clone)]
struct CachedContacts {
    contacts: Vec<Contact>,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedContacts>,
    /// Last invalidation of each tenant, as a value of `counter`.
    invalidated: HashMap<String, u64>,
    /// Last `invalidate_all`, as a value of `counter`.
    cleared: u64,
    counter: u64,
}

impl CacheState {
    fn generation(&self, tenant_id: &str) -> u64 {
        self.invalidated
            .get(tenant_id)
            .copied()
            .unwrap_or(0)
            .max(self.cleared)
    }

    fn bump(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }
}

/// Per-tenant cache of contact listings.
///
/// Owned by the HTTP layer. Any write to a tenant's contacts (create,
/// delete, live duplicate cleanup) must invalidate that tenant. Readers take
/// a `generation` before querying the database and hand it back to `store`,
/// which drops the listing if the tenant was invalidated in between.
pub struct ContactCache {
    state: Arc<Mutex<CacheState>>,
    ttl: Duration,
}

impl ContactCache {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    pub async fn generation(&self, tenant_id: &str) -> u64 {
        self.state.lock().await.generation(tenant_id)
    }

    /// Returns false when the listing was read before an invalidation and
    /// was not cached.
    pub async fn store(&self, tenant_id: &str, generation: u64, contacts: Vec<Contact>) -> bool {
        let mut state = self.state.lock().await;
        if state.generation(tenant_id) != generation {
            return false;
        }

        let cached = CachedContacts {
            contacts,
            expires_at: Utc::now() + self.ttl,
        };
        state.entries.insert(tenant_id.to_string(), cached);
        true
    }

    pub async fn get(&self, tenant_id: &str) -> Option<Vec<Contact>> {
        let mut state = self.state.lock().await;
        let expired = match state.entries.get(tenant_id) {
            Some(cached) if Utc::now() < cached.expires_at => {
                return Some(cached.contacts.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(tenant_id);
        }
        None
    }

    pub async fn invalidate(&self, tenant_id: &str) {
        let mut state = self.state.lock().await;
        let generation = state.bump();
        state.invalidated.insert(tenant_id.to_string(), generation);
        state.entries.remove(tenant_id);
    }

    pub async fn invalidate_all(&self) {
        let mut state = self.state.lock().await;
        let generation = state.bump();
        state.cleared = generation;
        state.invalidated.clear();
        state.entries.clear();
    }
}

impl Default for ContactCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::score::tests::bare_contact;

    async fn fill(cache: &ContactCache, tenant_id: &str, contacts: Vec<Contact>) {
        let generation = cache.generation(tenant_id).await;
        assert!(cache.store(tenant_id, generation, contacts).await);
    }

    #[tokio::test]
    async fn test_store_and_get() {
        let cache = ContactCache::default();
        fill(&cache, "T1", vec![bare_contact(1, "T1", "+1111")]).await;

        let cached = cache.get("T1").await.unwrap();
        assert_eq!(cached.len(), 1);
        assert!(cache.get("T2").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = ContactCache::new(0);
        fill(&cache, "T1", vec![bare_contact(1, "T1", "+1111")]).await;

        assert!(cache.get("T1").await.is_none());
        assert!(cache.state.lock().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_invalidation() {
        let cache = ContactCache::default();
        fill(&cache, "T1", vec![bare_contact(1, "T1", "+1111")]).await;
        fill(&cache, "T2", vec![bare_contact(2, "T2", "+2222")]).await;

        cache.invalidate("T1").await;
        assert!(cache.get("T1").await.is_none());
        assert!(cache.get("T2").await.is_some());

        cache.invalidate_all().await;
        assert!(cache.get("T2").await.is_none());
    }

    #[tokio::test]
    async fn test_listing_read_before_invalidate_is_not_stored() {
        let cache = ContactCache::default();
        let stale = vec![
            bare_contact(1, "T1", "+1111"),
            bare_contact(2, "T1", "+1111"),
        ];

        let generation = cache.generation("T1").await;
        cache.invalidate("T1").await;
        assert!(!cache.store("T1", generation, stale.clone()).await);
        assert!(cache.get("T1").await.is_none());

        let generation = cache.generation("T1").await;
        cache.invalidate_all().await;
        assert!(!cache.store("T1", generation, stale).await);
        assert!(cache.get("T1").await.is_none());
    }

    #[tokio::test]
    async fn test_other_tenant_invalidation_keeps_generation() {
        let cache = ContactCache::default();

        let generation = cache.generation("T1").await;
        cache.invalidate("T2").await;
        let contacts = vec![bare_contact(1, "T1", "+1111")];
        assert!(cache.store("T1", generation, contacts).await);
        assert!(cache.get("T1").await.is_some());
    }
}
