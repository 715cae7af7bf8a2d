//! # Showings Infrastructure
//!
//! Infrastructure implementations of core scheduling ports.
//!
//! This crate contains:
//! - SQLite-backed appointment storage
//! - Configuration loading (environment and files)
//! - The tracing-backed reminder dispatcher
//!
//! ## Architecture
//! - Implements traits defined in `showings-core`
//! - Depends on `showings-domain` and `showings-core`
//! - Contains all "impure" code (I/O, clock, database)

pub mod config;
pub mod database;
pub mod errors;
pub mod reminders;

// Re-export commonly used items
pub use database::*;
pub use reminders::*;
