//! Appointment conflict checking.
//!
//! The synchronous, advisory half of the double-booking guard. The storage
//! layer repeats the same test inside its write transaction, which is the
//! authoritative check under concurrency.

use chrono::{Duration, NaiveDate, NaiveTime};
use showings_domain::{Result, SchedulingError, VisitAppointment};
use uuid::Uuid;

/// A proposed claim on a schedule slot, either for a new appointment or for
/// a reschedule of an existing one.
#[derive(Debug, Clone)]
pub struct SlotClaim {
    /// Set for reschedules so the appointment does not conflict with itself.
    pub appointment_id: Option<Uuid>,
    pub property_id: String,
    pub agent_id: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub duration_minutes: u32,
}

impl SlotClaim {
    /// Half-open `[start, end)` interval of the claim.
    pub fn interval(&self) -> (NaiveTime, NaiveTime) {
        let end = self.start + Duration::minutes(i64::from(self.duration_minutes));
        (self.start, end)
    }
}

impl From<&VisitAppointment> for SlotClaim {
    fn from(appt: &VisitAppointment) -> Self {
        Self {
            appointment_id: Some(appt.id),
            property_id: appt.property.id.clone(),
            agent_id: appt.agent.as_ref().map(|a| a.id.clone()),
            date: appt.scheduled_date,
            start: appt.scheduled_time,
            duration_minutes: appt.duration_minutes,
        }
    }
}

/// Reject the claim if it overlaps an existing non-cancelled appointment for
/// the same property, or for the same agent on any property.
///
/// Must run before any persistence; on conflict the error names the blocking
/// appointment so the caller can offer a different slot.
pub fn check_conflict(claim: &SlotClaim, existing: &[VisitAppointment]) -> Result<()> {
    let (start, end) = claim.interval();

    for appt in existing {
        if Some(appt.id) == claim.appointment_id {
            continue;
        }
        if appt.status.is_cancelled() || appt.scheduled_date != claim.date {
            continue;
        }
        let same_property = appt.property.id == claim.property_id;
        let same_agent = match (&claim.agent_id, &appt.agent) {
            (Some(claimed), Some(assigned)) => *claimed == assigned.id,
            _ => false,
        };
        if (same_property || same_agent) && appt.overlaps(start, end) {
            return Err(SchedulingError::Conflict { conflicting_id: appt.id });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use showings_domain::{
        AgentSnapshot, ClientSnapshot, PropertySnapshot, VisitSource, VisitStatus,
    };

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn parse(t: &str) -> NaiveTime {
        NaiveTime::parse_from_str(t, "%H:%M").unwrap()
    }

    fn booked(property: &str, agent: Option<&str>, start: &str, duration: u32) -> VisitAppointment {
        VisitAppointment {
            id: Uuid::now_v7(),
            tenant_id: "t-1".into(),
            client: ClientSnapshot { id: "c-1".into(), name: "Ana".into(), phone: None },
            agent: agent.map(|id| AgentSnapshot {
                id: id.into(),
                name: "Marco".into(),
                phone: None,
            }),
            property: PropertySnapshot {
                id: property.into(),
                name: "Unit".into(),
                address: "Somewhere 1".into(),
            },
            scheduled_date: date(),
            scheduled_time: parse(start),
            duration_minutes: duration,
            status: VisitStatus::Scheduled,
            notes: None,
            client_requests: vec![],
            confirmed_by_client: false,
            reminder_enabled: false,
            reminder_sent: false,
            cancellation: None,
            source: VisitSource::Manual,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn claim(property: &str, agent: Option<&str>, start: &str, duration: u32) -> SlotClaim {
        SlotClaim {
            appointment_id: None,
            property_id: property.into(),
            agent_id: agent.map(Into::into),
            date: date(),
            start: parse(start),
            duration_minutes: duration,
        }
    }

    #[test]
    fn overlapping_claim_names_the_blocking_appointment() {
        let existing = vec![booked("p-1", None, "10:00", 60)];
        let err = check_conflict(&claim("p-1", None, "10:30", 30), &existing).unwrap_err();
        assert_eq!(err, SchedulingError::Conflict { conflicting_id: existing[0].id });
    }

    #[test]
    fn back_to_back_claims_are_accepted() {
        let existing = vec![booked("p-1", None, "10:00", 60)];
        check_conflict(&claim("p-1", None, "11:00", 60), &existing).unwrap();
        check_conflict(&claim("p-1", None, "09:00", 60), &existing).unwrap();
    }

    #[test]
    fn other_property_does_not_conflict() {
        let existing = vec![booked("p-1", None, "10:00", 60)];
        check_conflict(&claim("p-2", None, "10:00", 60), &existing).unwrap();
    }

    #[test]
    fn agent_cannot_be_double_booked_across_properties() {
        let existing = vec![booked("p-1", Some("a-1"), "10:00", 60)];
        let err = check_conflict(&claim("p-2", Some("a-1"), "10:30", 60), &existing).unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict { .. }));
        // A different agent at a different property is fine.
        check_conflict(&claim("p-2", Some("a-2"), "10:30", 60), &existing).unwrap();
    }

    #[test]
    fn cancelled_appointments_do_not_block() {
        let mut cancelled = booked("p-1", None, "10:00", 60);
        cancelled.status = VisitStatus::CancelledByAgent;
        check_conflict(&claim("p-1", None, "10:00", 60), &[cancelled]).unwrap();
    }

    #[test]
    fn reschedule_does_not_conflict_with_itself() {
        let existing = vec![booked("p-1", None, "10:00", 60)];
        let mut moved = SlotClaim::from(&existing[0]);
        moved.start = parse("10:30");
        check_conflict(&moved, &existing).unwrap();
    }

    #[test]
    fn different_date_does_not_conflict() {
        let existing = vec![booked("p-1", None, "10:00", 60)];
        let mut c = claim("p-1", None, "10:00", 60);
        c.date = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        check_conflict(&c, &existing).unwrap();
    }
}
