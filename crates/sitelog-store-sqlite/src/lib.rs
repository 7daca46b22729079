//! SQLite backend for the sitelog progress store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The single connection also
//! serializes writes, and multi-statement invariants (report upsert,
//! batch progress saves) run inside explicit transactions on top of the
//! schema's unique constraints.

mod encode;
mod schema;
mod store;

pub use store::SqliteStore;

#[cfg(test)]
mod tests;
