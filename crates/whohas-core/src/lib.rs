//! Core types and trait definitions for the whohas loan tracker.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! implement [`store::LoanStore`]; outer layers depend on that abstraction.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod lent_object;
pub mod store;

pub use error::{Error, Result};
pub use lent_object::{
  LentObject, LentObjectPatch, NewLentObject, whole_seconds,
};
pub use store::LoanStore;
