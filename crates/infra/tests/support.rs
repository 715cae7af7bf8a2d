//! Shared harness for `showings-infra` integration tests.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use showings_domain::{
    AgentSnapshot, ClientSnapshot, PropertySnapshot, VisitAppointment, VisitSource, VisitStatus,
};
use showings_infra::database::DbManager;
use tempfile::TempDir;
use uuid::Uuid;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with the schema applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should run");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Appointment fixture with sane defaults; tests override what they need.
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

pub fn agent(id: &str) -> AgentSnapshot {
    AgentSnapshot { id: id.to_owned(), name: format!("Agent {id}"), phone: None }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

pub fn time(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).expect("valid test time")
}
