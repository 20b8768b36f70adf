//! The `LoanStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `whohas-store-sqlite`).
//! Outer layers (`whohas-cli`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::lent_object::{LentObject, LentObjectPatch, NewLentObject};

/// Abstraction over a whohas loan store backend.
///
/// Every write touches exactly one row and re-stamps its modification time,
/// except [`clear`](LoanStore::clear). Missing ids on `update`/`delete` are
/// reported as `false`, not as errors.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait LoanStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Persist a new loan and return its store-assigned id.
  fn create(
    &self,
    record: NewLentObject,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Merge `patch` into the row with `id`. Returns `false` if no such row.
  fn update(
    &self,
    id: i64,
    patch: LentObjectPatch,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Hard-delete the row with `id`. Returns `false` if no such row.
  fn delete(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Flag the item as back with its owner.
  fn mark_returned(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_ {
    self.update(id, LentObjectPatch::default().returned(true))
  }

  /// Flag a previously returned item as out on loan again.
  fn mark_lent_again(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_ {
    self.update(id, LentObjectPatch::default().returned(false))
  }

  /// Drop every row and recreate an empty table at the current schema.
  fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Retrieve a single loan. Returns `None` if not found.
  fn get(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<LentObject>, Self::Error>> + Send + '_;

  /// All loans, oldest loan date first.
  fn fetch_all(
    &self,
  ) -> impl Future<Output = Result<Vec<LentObject>, Self::Error>> + Send + '_;

  /// Loans not yet returned, oldest loan date first.
  fn fetch_active(
    &self,
  ) -> impl Future<Output = Result<Vec<LentObject>, Self::Error>> + Send + '_;

  /// Returned loans, oldest loan date first.
  fn fetch_returned(
    &self,
  ) -> impl Future<Output = Result<Vec<LentObject>, Self::Error>> + Send + '_;

  /// Number of stored loans.
  fn count(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
