//! Read-side projections over the appointment set.
//!
//! Pure functions of `(current date, appointment set, optional reference
//! date)` - recomputed on every query, no caching, no state of their own.

use chrono::{Datelike, Duration, NaiveDate};
use showings_domain::VisitAppointment;

/// Appointments scheduled for `today`, ordered by start time.
pub fn today_visits(appointments: &[VisitAppointment], today: NaiveDate) -> Vec<VisitAppointment> {
    let mut visits: Vec<VisitAppointment> = appointments
        .iter()
        .filter(|appt| appt.scheduled_date == today)
        .cloned()
        .collect();
    sort_by_schedule(&mut visits);
    visits
}

/// The next `limit` appointments strictly after `today`, excluding both
/// cancellation states, ascending by date then time.
pub fn upcoming_visits(
    appointments: &[VisitAppointment],
    today: NaiveDate,
    limit: usize,
) -> Vec<VisitAppointment> {
    let mut visits: Vec<VisitAppointment> = appointments
        .iter()
        .filter(|appt| appt.scheduled_date > today && !appt.status.is_cancelled())
        .cloned()
        .collect();
    sort_by_schedule(&mut visits);
    visits.truncate(limit);
    visits
}

/// Inclusive `[start-of-week, end-of-week]` bounds around a reference date.
/// Weeks start on Sunday.
pub fn week_bounds(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let back = i64::from(reference.weekday().num_days_from_sunday());
    let start = reference - Duration::days(back);
    (start, start + Duration::days(6))
}

/// Appointments falling inside the week of `reference`, ordered by date then
/// time.
pub fn week_visits(
    appointments: &[VisitAppointment],
    reference: NaiveDate,
) -> Vec<VisitAppointment> {
    let (start, end) = week_bounds(reference);
    let mut visits: Vec<VisitAppointment> = appointments
        .iter()
        .filter(|appt| appt.scheduled_date >= start && appt.scheduled_date <= end)
        .cloned()
        .collect();
    sort_by_schedule(&mut visits);
    visits
}

fn sort_by_schedule(visits: &mut [VisitAppointment]) {
    visits.sort_by_key(|appt| (appt.scheduled_date, appt.scheduled_time));
}
