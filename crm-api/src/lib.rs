pub mod config;
pub mod database;
pub mod dedup;
pub mod handlers;
pub mod helpers;

pub use database::Database;
