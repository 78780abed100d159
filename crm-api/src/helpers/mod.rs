pub mod contact_cache;
pub mod database;
