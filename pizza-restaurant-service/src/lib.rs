use diesel::prelude::*;
use diesel::result::ConnectionResult;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod seed;
pub mod serializer;
pub mod service;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

pub const MIN_PRICE: i32 = 1;
pub const MAX_PRICE: i32 = 30;

/// Opens a plain connection, without running migrations.
///
/// The bundled SQLite enforces foreign keys by default; the migration helpers
/// in [`db`] switch enforcement off while they run.
pub fn establish_connection(database_url: &str) -> ConnectionResult<SqliteConnection> {
    SqliteConnection::establish(database_url)
}
