//! Free time-slot calculation over a tenant's operating window.

use chrono::NaiveTime;
use showings_domain::{OperatingHours, VisitAppointment};

/// Compute the free slot start-times for one calendar day.
///
/// Candidates are generated at the configured granularity inside
/// `[open, close)`; a candidate spanning one slot step is dropped when it
/// overlaps any existing non-cancelled appointment's half-open interval.
/// Back-to-back bookings are allowed.
///
/// The caller is responsible for pre-filtering `existing` to the relevant
/// tenant, date, and (optionally) property or agent. An empty return value
/// means the day is fully booked; it is not an error.
pub fn available_slots(hours: &OperatingHours, existing: &[VisitAppointment]) -> Vec<NaiveTime> {
    let step = hours.slot_step();
    let mut slots = Vec::new();
    let mut candidate = hours.open;

    while candidate < hours.close {
        let candidate_end = candidate + step;
        // Candidates must fit entirely inside the operating window. NaiveTime
        // addition wraps at midnight; a wrapped end ran off the day.
        if candidate_end > hours.close || candidate_end <= candidate {
            break;
        }
        let free = existing
            .iter()
            .filter(|appt| !appt.status.is_cancelled())
            .all(|appt| !appt.overlaps(candidate, candidate_end));
        if free {
            slots.push(candidate);
        }
        candidate = candidate_end;
    }

    slots
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Utc};
    use showings_domain::{
        ClientSnapshot, PropertySnapshot, VisitSource, VisitStatus,
    };
    use uuid::Uuid;

    use super::*;

    fn hours(open: &str, close: &str, slot_minutes: u32) -> OperatingHours {
        OperatingHours {
            open: parse(open),
            close: parse(close),
            slot_minutes,
        }
    }

    fn parse(t: &str) -> NaiveTime {
        NaiveTime::parse_from_str(t, "%H:%M").unwrap()
    }

    fn booking(start: &str, duration: u32, status: VisitStatus) -> VisitAppointment {
        VisitAppointment {
            id: Uuid::now_v7(),
            tenant_id: "t-1".into(),
            client: ClientSnapshot { id: "c-1".into(), name: "Ana".into(), phone: None },
            agent: None,
            property: PropertySnapshot {
                id: "p-1".into(),
                name: "Flat 3".into(),
                address: "High St 9".into(),
            },
            scheduled_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            scheduled_time: parse(start),
            duration_minutes: duration,
            status,
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

    #[test]
    fn empty_day_returns_whole_window() {
        let slots = available_slots(&hours("09:00", "12:00", 60), &[]);
        assert_eq!(slots, vec![parse("09:00"), parse("10:00"), parse("11:00")]);
    }

    #[test]
    fn booked_hour_is_removed() {
        // Operating 09:00-17:00 at 60-minute granularity with one 10:00-11:00
        // booking leaves every other hour free.
        let existing = vec![booking("10:00", 60, VisitStatus::Scheduled)];
        let slots = available_slots(&hours("09:00", "17:00", 60), &existing);
        let expect: Vec<NaiveTime> =
            ["09:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00"]
                .iter()
                .map(|t| parse(t))
                .collect();
        assert_eq!(slots, expect);
    }

    #[test]
    fn cancelled_booking_frees_the_slot() {
        let existing = vec![booking("10:00", 60, VisitStatus::CancelledByClient)];
        let slots = available_slots(&hours("09:00", "12:00", 60), &existing);
        assert_eq!(slots.len(), 3);
    }

    #[test]
    fn long_booking_blocks_multiple_slots() {
        let existing = vec![booking("10:00", 90, VisitStatus::Confirmed)];
        let slots = available_slots(&hours("09:00", "13:00", 30), &existing);
        // 10:00, 10:30, and 11:00 are blocked; 11:30 starts exactly at the end.
        assert_eq!(
            slots,
            vec![parse("09:00"), parse("09:30"), parse("11:30"), parse("12:00"), parse("12:30")]
        );
    }

    #[test]
    fn fully_booked_day_is_empty_not_an_error() {
        let existing = vec![booking("09:00", 180, VisitStatus::Scheduled)];
        let slots = available_slots(&hours("09:00", "12:00", 60), &existing);
        assert!(slots.is_empty());
    }
}
