//! SQLite backend for hourglass.
//!
//! Every operation opens its own [`rusqlite::Connection`], runs its
//! statements and closes the connection again; no connection outlives a call.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::VERSION;
pub use store::SqliteStore;
