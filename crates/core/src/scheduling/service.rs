//! Visit scheduling service - core business logic.
//!
//! Ties the slot calculator, conflict checker, and lifecycle rules together
//! behind a tenant-scoped, in-process API. Every operation takes the tenant
//! id explicitly; there is no ambient tenant context.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Utc};
use showings_domain::{
    AgentSnapshot, Cancellation, CancellingParty, ClientSnapshot, OperatingHours,
    PropertySnapshot, Result, SchedulingError, VisitAppointment, VisitResult, VisitSource,
    VisitStatus, VisitStatusKind,
};
use showings_domain::constants::DEFAULT_VISIT_DURATION_MINUTES;
use tracing::{error, info};
use uuid::Uuid;

use crate::reporting;
use crate::scheduling::conflict::{check_conflict, SlotClaim};
use crate::scheduling::lifecycle::ensure_transition;
use crate::scheduling::ports::{AppointmentFilter, AppointmentRepository, ReminderDispatcher};
use crate::scheduling::slots;

/// Request to create a visit appointment.
#[derive(Debug, Clone)]
pub struct NewVisit {
    pub tenant_id: String,
    pub client: ClientSnapshot,
    pub agent: Option<AgentSnapshot>,
    pub property: PropertySnapshot,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    /// Falls back to the service default when absent.
    pub duration_minutes: Option<u32>,
    pub notes: Option<String>,
    pub client_requests: Vec<String>,
    pub reminder_enabled: bool,
    pub source: VisitSource,
}

/// Partial schedule change for a reschedule; unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ScheduleChange {
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
}

/// Visit scheduling service.
pub struct SchedulingService {
    repository: Arc<dyn AppointmentRepository>,
    reminders: Option<Arc<dyn ReminderDispatcher>>,
    default_duration_minutes: u32,
}

impl SchedulingService {
    /// Create a new scheduling service over an appointment repository.
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self {
            repository,
            reminders: None,
            default_duration_minutes: DEFAULT_VISIT_DURATION_MINUTES,
        }
    }

    /// Attach a reminder dispatcher. Dispatch is best-effort: failures are
    /// logged and never fail the parent operation.
    pub fn with_reminders(mut self, dispatcher: Arc<dyn ReminderDispatcher>) -> Self {
        self.reminders = Some(dispatcher);
        self
    }

    /// Override the default visit duration.
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// Create a new appointment in the `scheduled` state.
    ///
    /// Validation and the advisory conflict check run before any
    /// persistence; the repository repeats the overlap check inside its
    /// write transaction, which is the authoritative guard.
    pub async fn schedule(&self, request: NewVisit) -> Result<VisitAppointment> {
        let duration = request.duration_minutes.unwrap_or(self.default_duration_minutes);
        validate_request(&request, duration, Utc::now().date_naive())?;

        let claim = SlotClaim {
            appointment_id: None,
            property_id: request.property.id.clone(),
            agent_id: request.agent.as_ref().map(|a| a.id.clone()),
            date: request.scheduled_date,
            start: request.scheduled_time,
            duration_minutes: duration,
        };
        let existing = self
            .repository
            .list(
                &request.tenant_id,
                &AppointmentFilter::on_date(request.scheduled_date).excluding_cancelled(),
            )
            .await?;
        check_conflict(&claim, &existing)?;

        let now = Utc::now();
        let appointment = VisitAppointment {
            id: Uuid::now_v7(),
            tenant_id: request.tenant_id,
            client: request.client,
            agent: request.agent,
            property: request.property,
            scheduled_date: request.scheduled_date,
            scheduled_time: request.scheduled_time,
            duration_minutes: duration,
            status: VisitStatus::Scheduled,
            notes: request.notes,
            client_requests: request.client_requests,
            confirmed_by_client: false,
            reminder_enabled: request.reminder_enabled,
            reminder_sent: false,
            cancellation: None,
            source: request.source,
            created_at: now,
            updated_at: now,
        };
        self.repository.create(&appointment).await?;

        info!(
            appointment_id = %appointment.id,
            tenant_id = %appointment.tenant_id,
            property_id = %appointment.property.id,
            date = %appointment.scheduled_date,
            "visit scheduled"
        );

        if appointment.reminder_enabled {
            self.dispatch_reminder(&appointment).await;
        }

        Ok(appointment)
    }

    /// Move a non-terminal appointment to a new date, time, or duration.
    pub async fn reschedule(
        &self,
        tenant_id: &str,
        id: Uuid,
        change: ScheduleChange,
    ) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        if appointment.status.is_terminal() {
            return Err(SchedulingError::validation(
                "status",
                format!("cannot reschedule a visit in state `{}`", appointment.status.kind()),
            ));
        }

        if let Some(date) = change.scheduled_date {
            appointment.scheduled_date = date;
        }
        if let Some(time) = change.scheduled_time {
            appointment.scheduled_time = time;
        }
        if let Some(duration) = change.duration_minutes {
            appointment.duration_minutes = duration;
        }
        validate_schedule(
            appointment.scheduled_date,
            appointment.scheduled_time,
            appointment.duration_minutes,
            Utc::now().date_naive(),
        )?;

        let existing = self
            .repository
            .list(
                tenant_id,
                &AppointmentFilter::on_date(appointment.scheduled_date).excluding_cancelled(),
            )
            .await?;
        check_conflict(&SlotClaim::from(&appointment), &existing)?;

        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;
        Ok(appointment)
    }

    /// Confirm a scheduled visit, recording client confirmation when the
    /// client drove it.
    pub async fn confirm(
        &self,
        tenant_id: &str,
        id: Uuid,
        by_client: bool,
    ) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        ensure_transition(appointment.status.kind(), VisitStatusKind::Confirmed)?;
        appointment.status = VisitStatus::Confirmed;
        if by_client {
            appointment.confirmed_by_client = true;
        }
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;
        Ok(appointment)
    }

    /// Mark a confirmed visit as underway. Informational only.
    pub async fn begin_visit(&self, tenant_id: &str, id: Uuid) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        ensure_transition(appointment.status.kind(), VisitStatusKind::InProgress)?;
        appointment.status = VisitStatus::InProgress;
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;
        Ok(appointment)
    }

    /// Close the visit with its outcome.
    ///
    /// The status flip and the result attachment are one atomic update;
    /// eligible from `confirmed` or `in_progress`. The result is immutable
    /// once recorded.
    pub async fn complete_visit(
        &self,
        tenant_id: &str,
        id: Uuid,
        result: VisitResult,
    ) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        ensure_transition(appointment.status.kind(), VisitStatusKind::Completed)?;
        appointment.status = VisitStatus::Completed { result };
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;

        info!(appointment_id = %appointment.id, tenant_id, "visit completed");
        Ok(appointment)
    }

    /// Cancel a non-terminal visit, recording the cancelling party and an
    /// optional reason.
    pub async fn cancel(
        &self,
        tenant_id: &str,
        id: Uuid,
        party: CancellingParty,
        reason: Option<String>,
    ) -> Result<VisitAppointment> {
        let target = match party {
            CancellingParty::Client => VisitStatus::CancelledByClient,
            CancellingParty::Agent => VisitStatus::CancelledByAgent,
        };
        let mut appointment = self.fetch(tenant_id, id).await?;
        ensure_transition(appointment.status.kind(), target.kind())?;
        appointment.status = target;
        appointment.cancellation = Some(Cancellation { party, reason });
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;

        info!(appointment_id = %appointment.id, tenant_id, ?party, "visit cancelled");
        Ok(appointment)
    }

    /// Record that the client did not show up.
    pub async fn mark_no_show(&self, tenant_id: &str, id: Uuid) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        ensure_transition(appointment.status.kind(), VisitStatusKind::NoShow)?;
        appointment.status = VisitStatus::NoShow;
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;
        Ok(appointment)
    }

    /// Record that an external dispatcher delivered the reminder.
    pub async fn mark_reminder_sent(&self, tenant_id: &str, id: Uuid) -> Result<VisitAppointment> {
        let mut appointment = self.fetch(tenant_id, id).await?;
        appointment.reminder_sent = true;
        appointment.updated_at = Utc::now();
        self.repository.update(&appointment).await?;
        Ok(appointment)
    }

    /// Fetch one appointment within the tenant scope.
    pub async fn get(&self, tenant_id: &str, id: Uuid) -> Result<VisitAppointment> {
        self.fetch(tenant_id, id).await
    }

    /// List appointments matching a filter.
    pub async fn list(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<VisitAppointment>> {
        self.repository.list(tenant_id, filter).await
    }

    /// Free slot start-times for one day, optionally narrowed to a property.
    pub async fn available_slots(
        &self,
        tenant_id: &str,
        property_id: Option<&str>,
        date: NaiveDate,
        hours: &OperatingHours,
    ) -> Result<Vec<NaiveTime>> {
        hours.validate()?;
        let mut filter = AppointmentFilter::on_date(date).excluding_cancelled();
        if let Some(property_id) = property_id {
            filter = filter.for_property(property_id);
        }
        let existing = self.repository.list(tenant_id, &filter).await?;
        Ok(slots::available_slots(hours, &existing))
    }

    /// Appointments scheduled for the current tenant-local day.
    pub async fn today_visits(&self, tenant_id: &str) -> Result<Vec<VisitAppointment>> {
        let today = Utc::now().date_naive();
        let appointments =
            self.repository.list(tenant_id, &AppointmentFilter::on_date(today)).await?;
        Ok(reporting::today_visits(&appointments, today))
    }

    /// The next `limit` non-cancelled appointments strictly after today.
    pub async fn upcoming_visits(
        &self,
        tenant_id: &str,
        limit: usize,
    ) -> Result<Vec<VisitAppointment>> {
        let today = Utc::now().date_naive();
        let filter = AppointmentFilter {
            from_date: today.succ_opt(),
            exclude_cancelled: true,
            ..AppointmentFilter::default()
        };
        let appointments = self.repository.list(tenant_id, &filter).await?;
        Ok(reporting::upcoming_visits(&appointments, today, limit))
    }

    /// Appointments in the week (Sunday-based) around `reference`.
    pub async fn week_visits(
        &self,
        tenant_id: &str,
        reference: NaiveDate,
    ) -> Result<Vec<VisitAppointment>> {
        let (start, end) = reporting::week_bounds(reference);
        let appointments =
            self.repository.list(tenant_id, &AppointmentFilter::between(start, end)).await?;
        Ok(reporting::week_visits(&appointments, reference))
    }

    async fn fetch(&self, tenant_id: &str, id: Uuid) -> Result<VisitAppointment> {
        self.repository
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {id}")))
    }

    async fn dispatch_reminder(&self, appointment: &VisitAppointment) {
        let Some(dispatcher) = &self.reminders else {
            return;
        };
        if let Err(err) = dispatcher.reminder_flagged(appointment).await {
            error!(
                appointment_id = %appointment.id,
                error = %err,
                "reminder dispatch failed; appointment kept"
            );
        }
    }
}

fn validate_request(request: &NewVisit, duration: u32, today: NaiveDate) -> Result<()> {
    if request.tenant_id.trim().is_empty() {
        return Err(SchedulingError::validation("tenant_id", "tenant id is required"));
    }
    if request.client.id.trim().is_empty() {
        return Err(SchedulingError::validation("client.id", "client id is required"));
    }
    if request.client.name.trim().is_empty() {
        return Err(SchedulingError::validation("client.name", "client name is required"));
    }
    if request.property.id.trim().is_empty() {
        return Err(SchedulingError::validation("property.id", "property id is required"));
    }
    validate_schedule(request.scheduled_date, request.scheduled_time, duration, today)
}

fn validate_schedule(
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
    today: NaiveDate,
) -> Result<()> {
    if date < today {
        return Err(SchedulingError::validation(
            "scheduled_date",
            "scheduled date is in the past",
        ));
    }
    // Storage keys slots by whole minutes; a finer start time would let the
    // in-memory and stored overlap checks disagree.
    if time.second() != 0 || time.nanosecond() != 0 {
        return Err(SchedulingError::validation(
            "scheduled_time",
            "start time must fall on a whole minute",
        ));
    }
    if duration_minutes == 0 {
        return Err(SchedulingError::validation(
            "duration_minutes",
            "duration must be positive",
        ));
    }
    let (_, wrapped) =
        time.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
    if wrapped != 0 {
        return Err(SchedulingError::validation(
            "duration_minutes",
            "visit may not cross midnight",
        ));
    }
    Ok(())
}
