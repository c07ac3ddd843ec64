//! Flat-file CSV backend for hourglass.
//!
//! The whole store is one text file: a fixed-width front matter line holding
//! the schema version and the last assigned id, a header record, then one
//! CSV record per activity in append order. Updates and deletes rewrite the
//! file in place; see [`splice`] for how records of a different length are
//! handled.

mod front_matter;
mod record;
mod store;

pub mod error;
pub mod splice;

pub use error::{Error, Result};
pub use front_matter::FrontMatter;
pub use store::{CsvStore, VERSION};
