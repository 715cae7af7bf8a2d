//! Database implementations

pub mod appointment_repository;
pub mod manager;

pub use appointment_repository::*;
pub use manager::*;
