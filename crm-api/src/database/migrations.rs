use rusqlite::Connection;

/// Run all database migrations
pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    // Create contacts table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS contacts_contact (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tenant_id VARCHAR(50),
            phone VARCHAR(20) NOT NULL,
            name VARCHAR(255),
            email VARCHAR(255),
            address TEXT,
            description TEXT,
            bg_id VARCHAR(50),
            bg_name VARCHAR(255),
            template_key VARCHAR(50),
            last_seen VARCHAR,
            last_delivered VARCHAR,
            last_replied VARCHAR,
            custom_field VARCHAR,
            manual_mode BOOLEAN,
            created_on VARCHAR
        )",
        [],
    )?;

    // Duplicate detection and tenant lookups group on (tenant_id, phone)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_tenant_phone
            ON contacts_contact(tenant_id, phone)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_contacts_tenant_created
            ON contacts_contact(tenant_id, created_on)",
        [],
    )?;

    Ok(())
}

/// Check if database tables exist
pub fn has_schema(conn: &Connection) -> anyhow::Result<bool> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name='contacts_contact'")?;
    Ok(stmt.exists([])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(!has_schema(&conn).unwrap());

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert!(has_schema(&conn).unwrap());

        let index_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND tbl_name = 'contacts_contact'
                   AND name LIKE 'idx_contacts_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(index_count, 2);
    }
}
