use async_trait::async_trait;
use shared_types::Contact;

/// Failures reported by a [`ContactStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached at all (pool exhausted, file gone...).
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The rows changed underneath us, e.g. a concurrent cleanup already
    /// removed them.
    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("Query failed: {0}")]
    Query(String),
}

/// Relational operations the duplicate cleanup needs from its backing store.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Bulk-read contacts, restricted to one tenant when `tenant_id` is set.
    async fn load_contacts(&self, tenant_id: Option<&str>) -> Result<Vec<Contact>, StoreError>;

    /// Atomically delete `duplicate_ids`, provided `survivor_id` and every
    /// duplicate still exist. Returns [`StoreError::Conflict`] and deletes
    /// nothing otherwise.
    async fn delete_duplicates(
        &self,
        survivor_id: i64,
        duplicate_ids: &[i64],
    ) -> Result<usize, StoreError>;
}
