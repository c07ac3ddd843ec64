//! Time source used to stamp activities.
//!
//! Storage never asks the clock for anything; only the command layer does.
//! Swapping in [`FixedClock`] makes command output deterministic in tests.

use chrono::{DateTime, Local, TimeDelta};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Local>;

  fn since(&self, t: DateTime<Local>) -> TimeDelta { self.now() - t }
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Local> { Local::now() }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Local> { self.0 }
}
