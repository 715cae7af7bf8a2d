//! Visit scheduling: slot calculation, conflict checking, and lifecycle.

pub mod conflict;
pub mod lifecycle;
pub mod ports;
pub mod service;
pub mod slots;

pub use service::SchedulingService;
