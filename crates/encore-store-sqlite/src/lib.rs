//! SQLite backend for the Encore achievement store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread pool without blocking the async runtime. The layout mirrors the
//! upstream key/value shape: one wide per-user table addressed by
//! `(partition key, encoded sort key)` plus a global artist directory.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
