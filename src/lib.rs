//! Songify Catalog Server Library
//!
//! Albums, bands and songs with role-gated editing, plus per-user liked songs.

pub mod catalog;
pub mod catalog_store;
pub mod config;
pub mod database;
pub mod server;
pub mod sqlite_persistence;
pub mod user;

pub use catalog::{CatalogManager, OperationError};
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use user::{SqliteUserStore, UserManager, UserRole, UserStore};
