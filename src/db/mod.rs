//! SQLite storage: pool and migrations

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
