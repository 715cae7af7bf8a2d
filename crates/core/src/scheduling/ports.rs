//! Port interfaces for visit scheduling.
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use showings_domain::{Result, VisitAppointment, VisitStatusKind};
use uuid::Uuid;

/// Query filter for appointment listings. All clauses are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    /// Exact calendar date.
    pub date: Option<NaiveDate>,
    /// Inclusive lower date bound.
    pub from_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to_date: Option<NaiveDate>,
    pub property_id: Option<String>,
    pub agent_id: Option<String>,
    pub status: Option<VisitStatusKind>,
    /// Drop appointments in either cancellation state.
    pub exclude_cancelled: bool,
}

impl AppointmentFilter {
    /// Filter to a single calendar date.
    pub fn on_date(date: NaiveDate) -> Self {
        Self { date: Some(date), ..Self::default() }
    }

    /// Filter to an inclusive date range.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from_date: Some(from), to_date: Some(to), ..Self::default() }
    }

    pub fn for_property(mut self, property_id: impl Into<String>) -> Self {
        self.property_id = Some(property_id.into());
        self
    }

    pub fn for_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_status(mut self, status: VisitStatusKind) -> Self {
        self.status = Some(status);
        self
    }

    pub fn excluding_cancelled(mut self) -> Self {
        self.exclude_cancelled = true;
        self
    }

    /// Whether an appointment satisfies every clause of this filter.
    ///
    /// The SQLite repository compiles the same predicate to a WHERE clause;
    /// in-memory implementations apply it directly.
    pub fn matches(&self, appt: &VisitAppointment) -> bool {
        if let Some(date) = self.date {
            if appt.scheduled_date != date {
                return false;
            }
        }
        if let Some(from) = self.from_date {
            if appt.scheduled_date < from {
                return false;
            }
        }
        if let Some(to) = self.to_date {
            if appt.scheduled_date > to {
                return false;
            }
        }
        if let Some(property_id) = &self.property_id {
            if appt.property.id != *property_id {
                return false;
            }
        }
        if let Some(agent_id) = &self.agent_id {
            if !appt.agent.as_ref().map_or(false, |a| a.id == *agent_id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if appt.status.kind() != status {
                return false;
            }
        }
        if self.exclude_cancelled && appt.status.is_cancelled() {
            return false;
        }
        true
    }
}

/// Trait for persisting visit appointments.
///
/// Every method is scoped to a tenant; implementations must never let data
/// cross tenant boundaries. `create` and `update` are the authoritative
/// double-booking guard: they re-run the overlap check inside a single
/// storage transaction so that two concurrent callers cannot both pass.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Fetch one appointment within the tenant scope.
    async fn get(&self, tenant_id: &str, id: Uuid) -> Result<Option<VisitAppointment>>;

    /// List appointments matching the filter, ordered by date then time.
    async fn list(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<VisitAppointment>>;

    /// Persist a new appointment; fails with `Conflict` if its interval
    /// overlaps an existing non-cancelled appointment for the same property
    /// or agent.
    async fn create(&self, appointment: &VisitAppointment) -> Result<()>;

    /// Replace an existing appointment; re-runs the overlap check for the
    /// (possibly moved) schedule. Fails with `NotFound` when the id does not
    /// resolve within the appointment's tenant.
    async fn update(&self, appointment: &VisitAppointment) -> Result<()>;
}

/// Trait for the reminder boundary.
///
/// The core only records reminder flags; delivery belongs to an external
/// dispatcher. Failures here are best-effort and never fail the parent
/// scheduling operation.
#[async_trait]
pub trait ReminderDispatcher: Send + Sync {
    /// Called after an appointment with `reminder_enabled` is persisted.
    async fn reminder_flagged(&self, appointment: &VisitAppointment) -> Result<()>;
}
