use async_trait::async_trait;
use rusqlite::{params_from_iter, TransactionBehavior};
use shared_types::Contact;

use crate::database::contacts as contacts_db;
use crate::database::AsyncDbConnection;
use crate::dedup::{ContactStore, StoreError};

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// [`ContactStore`] backed by the pooled SQLite database.
pub struct SqliteContactStore {
    conn: AsyncDbConnection,
}

impl SqliteContactStore {
    pub fn new(conn: AsyncDbConnection) -> Self {
        Self { conn }
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[async_trait]
impl ContactStore for SqliteContactStore {
    async fn load_contacts(&self, tenant_id: Option<&str>) -> Result<Vec<Contact>, StoreError> {
        contacts_db::list_all_contacts(self.conn.clone(), tenant_id)
            .await
            .map_err(|e| match e.downcast::<r2d2::Error>() {
                Ok(pool_err) => StoreError::from(pool_err),
                Err(e) => StoreError::Query(e.to_string()),
            })
    }

    async fn delete_duplicates(
        &self,
        survivor_id: i64,
        duplicate_ids: &[i64],
    ) -> Result<usize, StoreError> {
        if duplicate_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.lock().await?;

        // IMMEDIATE takes the write lock up front so a concurrent run cannot
        // interleave between the existence check and the delete.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let survivor_present: bool = tx
            .prepare("SELECT 1 FROM contacts_contact WHERE id = ?")?
            .exists([survivor_id])?;
        if !survivor_present {
            return Err(StoreError::Conflict(format!(
                "survivor contact {} no longer exists",
                survivor_id
            )));
        }

        let marks = placeholders(duplicate_ids.len());

        let present: i64 = tx.query_row(
            &format!("SELECT COUNT(*) FROM contacts_contact WHERE id IN ({marks})"),
            params_from_iter(duplicate_ids.iter()),
            |row| row.get(0),
        )?;
        if present as usize != duplicate_ids.len() {
            return Err(StoreError::Conflict(format!(
                "{} of {} duplicate contacts already removed",
                duplicate_ids.len() - present as usize,
                duplicate_ids.len()
            )));
        }

        let deleted = tx.execute(
            &format!("DELETE FROM contacts_contact WHERE id IN ({marks})"),
            params_from_iter(duplicate_ids.iter()),
        )?;

        tx.commit()?;

        Ok(deleted)
    }
}
