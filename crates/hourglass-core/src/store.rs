//! The `ActivityStore` trait.
//!
//! The trait is implemented by storage backends (`hourglass-store-sqlite`,
//! `hourglass-store-csv`). The command layer is generic over it and never
//! names a concrete backend.

use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::activity::Activity;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an activity store backend.
///
/// Every call is synchronous and self-contained. Implementations must be safe
/// to share between threads of one process; nothing here protects against a
/// second process writing the same store.
pub trait ActivityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Schema ────────────────────────────────────────────────────────────

  /// Whether the backend can be opened at all. Never mutates the store.
  fn valid(&self) -> Result<bool, Self::Error>;

  /// The schema version currently persisted.
  fn version(&self) -> Result<u32, Self::Error>;

  /// Bring the store up to the latest schema version, one step at a time.
  /// A no-op when already current.
  fn migrate(&self) -> Result<(), Self::Error>;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Insert `activity` if its id is 0 (and assign the new id), otherwise
  /// overwrite the record with that id.
  fn save_activity(&self, activity: &mut Activity) -> Result<(), Self::Error>;

  /// Remove the record with `id`. Fails with the backend's not-found error
  /// if there is none.
  fn delete_activity(&self, id: i64) -> Result<(), Self::Error>;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fails with the backend's not-found error if no record has `id`.
  fn find_activity(&self, id: i64) -> Result<Activity, Self::Error>;

  /// Every record, in a stable backend-defined order.
  fn find_all_activities(&self) -> Result<Vec<Activity>, Self::Error>;

  fn find_running_activities(&self) -> Result<Vec<Activity>, Self::Error>;

  /// Records with `lower <= start < upper`.
  fn find_activities_between(
    &self,
    lower: DateTime<Local>,
    upper: DateTime<Local>,
  ) -> Result<Vec<Activity>, Self::Error>;
}

// ─── Forwarding impls ────────────────────────────────────────────────────────

macro_rules! forward_store {
  ($($ty:ty),*) => {$(
    impl<T: ActivityStore + ?Sized> ActivityStore for $ty {
      type Error = T::Error;

      fn valid(&self) -> Result<bool, Self::Error> { (**self).valid() }

      fn version(&self) -> Result<u32, Self::Error> { (**self).version() }

      fn migrate(&self) -> Result<(), Self::Error> { (**self).migrate() }

      fn save_activity(&self, activity: &mut Activity) -> Result<(), Self::Error> {
        (**self).save_activity(activity)
      }

      fn delete_activity(&self, id: i64) -> Result<(), Self::Error> {
        (**self).delete_activity(id)
      }

      fn find_activity(&self, id: i64) -> Result<Activity, Self::Error> {
        (**self).find_activity(id)
      }

      fn find_all_activities(&self) -> Result<Vec<Activity>, Self::Error> {
        (**self).find_all_activities()
      }

      fn find_running_activities(&self) -> Result<Vec<Activity>, Self::Error> {
        (**self).find_running_activities()
      }

      fn find_activities_between(
        &self,
        lower: DateTime<Local>,
        upper: DateTime<Local>,
      ) -> Result<Vec<Activity>, Self::Error> {
        (**self).find_activities_between(lower, upper)
      }
    }
  )*};
}

forward_store!(&T, Arc<T>, Box<T>);
