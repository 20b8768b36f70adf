//! SQLite backend for the whohas loan tracker.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`StoreRegistry`] hands out one shared
//! [`SqliteStore`] per [`StoreContext`].

mod encode;
mod store;

pub mod error;
pub mod preferences;
pub mod registry;
pub mod schema;

pub use error::{Error, Result};
pub use preferences::Preferences;
pub use registry::{StoreContext, StoreRegistry};
pub use schema::{SCHEMA_VERSION, SchemaOutcome};
pub use store::SqliteStore;
