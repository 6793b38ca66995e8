//! # Tally Snapshot Crate
//!
//! This crate is the data-access boundary of the system. It loads a JSON export
//! of orders, line items, products and sellers, and answers the scoped queries
//! the report builders need.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Everything about where records come from and how they are
//!   joined lives here. The analytics core only ever sees `RawOrder` values.
//! - **Read-only:** A loaded snapshot is never mutated, so every component of
//!   a report reads the same consistent data.
//!
//! ## Public API
//!
//! - `load`: Reads a snapshot file and builds a `SnapshotRepository`.
//! - `SnapshotRepository`: Scoped order queries and product/seller lookups.
//! - `SnapshotError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod loader;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use error::SnapshotError;
pub use loader::{SnapshotData, load};
pub use repository::SnapshotRepository;
