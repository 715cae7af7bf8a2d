//! Shared test helpers for `showings-core` integration tests.
//!
//! Provides an in-memory appointment repository and reminder dispatcher
//! doubles so the scheduling tests can focus on behaviour instead of
//! storage boilerplate.

pub mod repositories;

use chrono::{NaiveDate, NaiveTime, Utc};
use showings_domain::{
    AgentSnapshot, ClientSnapshot, PropertySnapshot, VisitAppointment, VisitSource, VisitStatus,
};
use uuid::Uuid;

/// Build an appointment fixture with sane defaults.
///
/// Tests override the fields they care about after construction.
pub fn appointment(
    tenant_id: &str,
    property_id: &str,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: u32,
) -> VisitAppointment {
    let now = Utc::now();
    VisitAppointment {
        id: Uuid::now_v7(),
        tenant_id: tenant_id.to_owned(),
        client: ClientSnapshot {
            id: "client-1".to_owned(),
            name: "Maria Rossi".to_owned(),
            phone: Some("+39 333 000 0000".to_owned()),
        },
        agent: None,
        property: PropertySnapshot {
            id: property_id.to_owned(),
            name: format!("Property {property_id}"),
            address: "Via Roma 1".to_owned(),
        },
        scheduled_date: date,
        scheduled_time: time,
        duration_minutes,
        status: VisitStatus::Scheduled,
        notes: None,
        client_requests: Vec::new(),
        confirmed_by_client: false,
        reminder_enabled: false,
        reminder_sent: false,
        cancellation: None,
        source: VisitSource::Manual,
        created_at: now,
        updated_at: now,
    }
}

/// Agent snapshot fixture.
pub fn agent(id: &str) -> AgentSnapshot {
    AgentSnapshot {
        id: id.to_owned(),
        name: format!("Agent {id}"),
        phone: None,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}
