use std::path::PathBuf;

/// Returns the default path of the CRM database
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/wacrm/crm.sqlite`
/// - **Linux**: `~/.local/share/wacrm/crm.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\wacrm\crm.sqlite`
pub fn get_db_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("wacrm").join("crm.sqlite"))
}

/// Initialize the database connection, preferring a configured path over
/// the platform default
pub fn initialize_database(
    configured_path: Option<&str>,
) -> anyhow::Result<std::sync::Arc<crate::database::Database>> {
    let db_path = match configured_path {
        Some(path) => PathBuf::from(path),
        None => get_db_path()?,
    };

    tracing::info!("Opening database at {:?}", db_path);
    let db = crate::database::Database::new(&db_path)?;
    Ok(std::sync::Arc::new(db))
}
