//! # Showings Domain
//!
//! Business domain types and models for the visit scheduling core.
//!
//! This crate contains:
//! - Visit appointment types (`VisitAppointment`, `VisitStatus`, `VisitResult`)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other showings crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
