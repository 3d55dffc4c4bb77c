//! Gatehouse persistence layer
//!
//! Exposes the [`JobStore`] capability used by the upload admission flow and its
//! PostgreSQL implementation.

pub mod db;

pub use db::jobs::{JobStore, PgJobStore};
