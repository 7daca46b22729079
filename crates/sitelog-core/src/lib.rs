//! Core types and trait definitions for the sitelog progress tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod error;
pub mod ident;
pub mod notify;
pub mod progress;
pub mod report;
pub mod roster;
pub mod store;

pub use error::{Error, ErrorKind, Result};
