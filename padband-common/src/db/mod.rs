//! Database layer
//!
//! SQLite via sqlx. Schema creation is idempotent; every `CREATE TABLE` uses
//! `IF NOT EXISTS` so startup is safe on both first run and upgrade.

pub mod init;

pub use init::init_database;
