//! In-memory port implementations for scheduling tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use showings_core::{check_conflict, AppointmentFilter, AppointmentRepository, ReminderDispatcher, SlotClaim};
use showings_domain::{Result as DomainResult, SchedulingError, VisitAppointment};
use uuid::Uuid;

/// In-memory `AppointmentRepository`.
///
/// Mirrors the storage contract: writes re-run the overlap check against
/// the stored set, so conflict behaviour matches the real repository.
#[derive(Default, Clone)]
pub struct InMemoryAppointmentRepository {
    appointments: Arc<Mutex<Vec<VisitAppointment>>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository, bypassing conflict checks.
    pub fn seed(&self, appointment: VisitAppointment) {
        self.lock().push(appointment);
    }

    pub fn stored(&self) -> Vec<VisitAppointment> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<VisitAppointment>> {
        match self.appointments.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn get(&self, tenant_id: &str, id: Uuid) -> DomainResult<Option<VisitAppointment>> {
        Ok(self
            .lock()
            .iter()
            .find(|appt| appt.tenant_id == tenant_id && appt.id == id)
            .cloned())
    }

    async fn list(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> DomainResult<Vec<VisitAppointment>> {
        let mut matched: Vec<VisitAppointment> = self
            .lock()
            .iter()
            .filter(|appt| appt.tenant_id == tenant_id && filter.matches(appt))
            .cloned()
            .collect();
        matched.sort_by_key(|appt| (appt.scheduled_date, appt.scheduled_time));
        Ok(matched)
    }

    async fn create(&self, appointment: &VisitAppointment) -> DomainResult<()> {
        let mut store = self.lock();
        let peers: Vec<VisitAppointment> = store
            .iter()
            .filter(|appt| appt.tenant_id == appointment.tenant_id)
            .cloned()
            .collect();
        check_conflict(&SlotClaim::from(appointment), &peers)?;
        store.push(appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &VisitAppointment) -> DomainResult<()> {
        let mut store = self.lock();
        let peers: Vec<VisitAppointment> = store
            .iter()
            .filter(|appt| appt.tenant_id == appointment.tenant_id)
            .cloned()
            .collect();
        check_conflict(&SlotClaim::from(appointment), &peers)?;
        let slot = store
            .iter_mut()
            .find(|appt| appt.tenant_id == appointment.tenant_id && appt.id == appointment.id)
            .ok_or_else(|| SchedulingError::NotFound(format!("appointment {}", appointment.id)))?;
        *slot = appointment.clone();
        Ok(())
    }
}

/// Reminder dispatcher that records how many times it was invoked.
#[derive(Default, Clone)]
pub struct RecordingReminderDispatcher {
    calls: Arc<AtomicUsize>,
}

impl RecordingReminderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReminderDispatcher for RecordingReminderDispatcher {
    async fn reminder_flagged(&self, _appointment: &VisitAppointment) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Reminder dispatcher that always fails.
#[derive(Default, Clone)]
pub struct FailingReminderDispatcher;

#[async_trait]
impl ReminderDispatcher for FailingReminderDispatcher {
    async fn reminder_flagged(&self, _appointment: &VisitAppointment) -> DomainResult<()> {
        Err(SchedulingError::Database("reminder channel unavailable".to_owned()))
    }
}
