//! SQLite backend for the survey engine.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The store handle is cheap to
//! clone and is passed explicitly to whoever needs it.

mod encode;
mod provision;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
