//! Core types and trait definitions for hourglass.
//!
//! This crate is deliberately free of database and file-format dependencies.
//! The storage backends and the command-line front end depend on it; it
//! depends on nothing but `chrono` and friends.

pub mod activity;
pub mod clock;
pub mod edit;
pub mod error;
pub mod migrate;
pub mod query;
pub mod store;
pub mod tags;
pub mod timestamp;

pub use activity::{Activity, Status};
pub use error::{Aggregate, Error, Result};
pub use store::ActivityStore;
