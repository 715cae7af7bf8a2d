//! Log-backed reminder dispatcher.
//!
//! Emits a structured event when a reminder-enabled appointment is booked.
//! An external notification channel can tail these events; delivery
//! acknowledgement flows back through `mark_reminder_sent`.

use async_trait::async_trait;
use showings_core::ReminderDispatcher;
use showings_domain::{Result, VisitAppointment};
use tracing::info;

/// Dispatcher that records reminder requests in the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReminderDispatcher;

impl TracingReminderDispatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ReminderDispatcher for TracingReminderDispatcher {
    async fn reminder_flagged(&self, appointment: &VisitAppointment) -> Result<()> {
        info!(
            appointment_id = %appointment.id,
            tenant_id = %appointment.tenant_id,
            client = %appointment.client.name,
            date = %appointment.scheduled_date,
            time = %appointment.scheduled_time,
            "visit reminder requested"
        );
        Ok(())
    }
}
