//! # Showings Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Slot calculation, conflict checking, and the visit lifecycle rules
//! - Port/adapter interfaces (traits)
//! - The scheduling service and reporting views
//!
//! ## Architecture Principles
//! - Only depends on `showings-domain`
//! - No database or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod reporting;
pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use scheduling::conflict::{check_conflict, SlotClaim};
pub use scheduling::lifecycle::{can_transition, ensure_transition};
pub use scheduling::ports::{AppointmentFilter, AppointmentRepository, ReminderDispatcher};
pub use scheduling::service::{NewVisit, ScheduleChange, SchedulingService};
pub use scheduling::slots::available_slots;
