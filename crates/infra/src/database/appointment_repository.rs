//! SQLite-backed implementation of the AppointmentRepository port.
//!
//! Writes run inside an immediate transaction that re-checks slot overlap
//! against committed rows, so two concurrent bookings of the same slot
//! cannot both succeed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row, ToSql, Transaction, TransactionBehavior};
use showings_core::{AppointmentFilter, AppointmentRepository};
use showings_domain::{
    AgentSnapshot, Cancellation, CancellingParty, ClientSnapshot, PropertySnapshot, Result,
    SchedulingError, VisitAppointment, VisitSource, VisitStatus, VisitStatusKind,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::InfraError;

const SELECT_COLUMNS: &str = "id, tenant_id,
    client_id, client_name, client_phone,
    agent_id, agent_name, agent_phone,
    property_id, property_name, property_address,
    scheduled_date, start_minute, duration_minutes,
    status, result_json,
    notes, client_requests_json,
    confirmed_by_client, reminder_enabled, reminder_sent,
    cancel_party, cancel_reason, source,
    created_at, updated_at";

/// SQLite implementation of AppointmentRepository.
pub struct SqliteAppointmentRepository {
    manager: Arc<DbManager>,
}

impl SqliteAppointmentRepository {
    /// Create a new appointment repository over a database manager.
    pub fn new(manager: Arc<DbManager>) -> Self {
        Self { manager }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    #[instrument(skip(self))]
    async fn get(&self, tenant_id: &str, id: Uuid) -> Result<Option<VisitAppointment>> {
        let conn = self.manager.get_connection()?;
        let appointment = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLUMNS} FROM visit_appointments
                     WHERE tenant_id = ?1 AND id = ?2"
                ),
                params![tenant_id, id.to_string()],
                read_appointment,
            )
            .optional()
            .map_err(InfraError::from)?;
        Ok(appointment)
    }

    #[instrument(skip(self, filter))]
    async fn list(
        &self,
        tenant_id: &str,
        filter: &AppointmentFilter,
    ) -> Result<Vec<VisitAppointment>> {
        let mut sql = format!(
            "SELECT {SELECT_COLUMNS} FROM visit_appointments WHERE tenant_id = ?1"
        );
        let mut bindings: Vec<Box<dyn ToSql>> = vec![Box::new(tenant_id.to_owned())];

        if let Some(date) = filter.date {
            bindings.push(Box::new(date.to_string()));
            sql.push_str(&format!(" AND scheduled_date = ?{}", bindings.len()));
        }
        if let Some(from) = filter.from_date {
            bindings.push(Box::new(from.to_string()));
            sql.push_str(&format!(" AND scheduled_date >= ?{}", bindings.len()));
        }
        if let Some(to) = filter.to_date {
            bindings.push(Box::new(to.to_string()));
            sql.push_str(&format!(" AND scheduled_date <= ?{}", bindings.len()));
        }
        if let Some(property_id) = &filter.property_id {
            bindings.push(Box::new(property_id.clone()));
            sql.push_str(&format!(" AND property_id = ?{}", bindings.len()));
        }
        if let Some(agent_id) = &filter.agent_id {
            bindings.push(Box::new(agent_id.clone()));
            sql.push_str(&format!(" AND agent_id = ?{}", bindings.len()));
        }
        if let Some(status) = filter.status {
            bindings.push(Box::new(status.as_str()));
            sql.push_str(&format!(" AND status = ?{}", bindings.len()));
        }
        if filter.exclude_cancelled {
            sql.push_str(" AND status NOT IN ('cancelled_by_client', 'cancelled_by_agent')");
        }
        sql.push_str(" ORDER BY scheduled_date, start_minute");

        debug!(tenant_id, clauses = bindings.len(), "listing appointments");

        let conn = self.manager.get_connection()?;
        let mut stmt = conn.prepare(&sql).map_err(InfraError::from)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(bindings.iter().map(|b| b.as_ref())),
                read_appointment,
            )
            .map_err(InfraError::from)?;

        let mut appointments = Vec::new();
        for row in rows {
            appointments.push(row.map_err(InfraError::from)?);
        }
        Ok(appointments)
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn create(&self, appointment: &VisitAppointment) -> Result<()> {
        let mut conn = self.manager.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(InfraError::from)?;

        ensure_slot_free(&tx, appointment)?;
        tx.execute(
            "INSERT INTO visit_appointments (
                id, tenant_id,
                client_id, client_name, client_phone,
                agent_id, agent_name, agent_phone,
                property_id, property_name, property_address,
                scheduled_date, start_minute, duration_minutes,
                status, result_json,
                notes, client_requests_json,
                confirmed_by_client, reminder_enabled, reminder_sent,
                cancel_party, cancel_reason, source,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                      ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)",
            rusqlite::params_from_iter(write_params(appointment)?.iter().map(|b| b.as_ref())),
        )
        .map_err(InfraError::from)?;
        tx.commit().map_err(InfraError::from)?;

        debug!(appointment_id = %appointment.id, "appointment created");
        Ok(())
    }

    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn update(&self, appointment: &VisitAppointment) -> Result<()> {
        let mut conn = self.manager.get_connection()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(InfraError::from)?;

        ensure_slot_free(&tx, appointment)?;
        let changed = tx
            .execute(
                "UPDATE visit_appointments SET
                    client_id = ?3, client_name = ?4, client_phone = ?5,
                    agent_id = ?6, agent_name = ?7, agent_phone = ?8,
                    property_id = ?9, property_name = ?10, property_address = ?11,
                    scheduled_date = ?12, start_minute = ?13, duration_minutes = ?14,
                    status = ?15, result_json = ?16,
                    notes = ?17, client_requests_json = ?18,
                    confirmed_by_client = ?19, reminder_enabled = ?20, reminder_sent = ?21,
                    cancel_party = ?22, cancel_reason = ?23, source = ?24,
                    created_at = ?25, updated_at = ?26
                 WHERE id = ?1 AND tenant_id = ?2",
                rusqlite::params_from_iter(write_params(appointment)?.iter().map(|b| b.as_ref())),
            )
            .map_err(InfraError::from)?;
        if changed == 0 {
            return Err(SchedulingError::NotFound(format!("appointment {}", appointment.id)));
        }
        tx.commit().map_err(InfraError::from)?;

        debug!(appointment_id = %appointment.id, "appointment updated");
        Ok(())
    }
}

/// Reject the write when another live appointment holds an overlapping slot.
///
/// Conflicts require the same property or the same agent; cancelled rows and
/// the appointment's own row never block.
fn ensure_slot_free(tx: &Transaction<'_>, appointment: &VisitAppointment) -> Result<()> {
    if appointment.status.is_cancelled() {
        return Ok(());
    }

    let start = minutes_after_midnight(appointment.scheduled_time);
    let end = start + i64::from(appointment.duration_minutes);
    let agent_id = appointment.agent.as_ref().map(|a| a.id.clone());

    let conflicting: Option<String> = tx
        .query_row(
            "SELECT id FROM visit_appointments
             WHERE tenant_id = ?1
               AND scheduled_date = ?2
               AND id <> ?3
               AND status NOT IN ('cancelled_by_client', 'cancelled_by_agent')
               AND (property_id = ?4 OR (agent_id IS NOT NULL AND agent_id = ?5))
               AND start_minute < ?6
               AND ?7 < start_minute + duration_minutes
             LIMIT 1",
            params![
                appointment.tenant_id,
                appointment.scheduled_date.to_string(),
                appointment.id.to_string(),
                appointment.property.id,
                agent_id,
                end,
                start,
            ],
            |row| row.get(0),
        )
        .optional()
        .map_err(InfraError::from)?;

    match conflicting {
        Some(id) => {
            let conflicting_id = Uuid::parse_str(&id)
                .map_err(|e| SchedulingError::Database(format!("stored id is invalid: {e}")))?;
            Err(SchedulingError::Conflict { conflicting_id })
        }
        None => Ok(()),
    }
}

fn minutes_after_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

fn write_params(appointment: &VisitAppointment) -> Result<Vec<Box<dyn ToSql>>> {
    let result_json = match &appointment.status {
        VisitStatus::Completed { result } => {
            Some(serde_json::to_string(result).map_err(InfraError::from)?)
        }
        _ => None,
    };
    let client_requests_json =
        serde_json::to_string(&appointment.client_requests).map_err(InfraError::from)?;
    let (cancel_party, cancel_reason) = match &appointment.cancellation {
        Some(record) => (Some(party_str(record.party)), record.reason.clone()),
        None => (None, None),
    };

    Ok(vec![
        Box::new(appointment.id.to_string()),
        Box::new(appointment.tenant_id.clone()),
        Box::new(appointment.client.id.clone()),
        Box::new(appointment.client.name.clone()),
        Box::new(appointment.client.phone.clone()),
        Box::new(appointment.agent.as_ref().map(|a| a.id.clone())),
        Box::new(appointment.agent.as_ref().map(|a| a.name.clone())),
        Box::new(appointment.agent.as_ref().and_then(|a| a.phone.clone())),
        Box::new(appointment.property.id.clone()),
        Box::new(appointment.property.name.clone()),
        Box::new(appointment.property.address.clone()),
        Box::new(appointment.scheduled_date.to_string()),
        Box::new(minutes_after_midnight(appointment.scheduled_time)),
        Box::new(appointment.duration_minutes),
        Box::new(appointment.status.kind().as_str()),
        Box::new(result_json),
        Box::new(appointment.notes.clone()),
        Box::new(client_requests_json),
        Box::new(appointment.confirmed_by_client),
        Box::new(appointment.reminder_enabled),
        Box::new(appointment.reminder_sent),
        Box::new(cancel_party),
        Box::new(cancel_reason),
        Box::new(appointment.source.as_str()),
        Box::new(appointment.created_at.timestamp()),
        Box::new(appointment.updated_at.timestamp()),
    ])
}

fn read_appointment(row: &Row<'_>) -> rusqlite::Result<VisitAppointment> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id).map_err(|e| conversion_err(0, e))?;

    let agent_id: Option<String> = row.get(5)?;
    let agent = match agent_id {
        Some(agent_id) => Some(AgentSnapshot {
            id: agent_id,
            name: row.get(6)?,
            phone: row.get(7)?,
        }),
        None => None,
    };

    let date: String = row.get(11)?;
    let scheduled_date: NaiveDate = date.parse().map_err(|e| conversion_err(11, e))?;
    let start_minute: i64 = row.get(12)?;
    let scheduled_time = time_from_minutes(start_minute).map_err(|e| conversion_err(12, e))?;

    let status_str: String = row.get(14)?;
    let result_json: Option<String> = row.get(15)?;
    let status = read_status(&status_str, result_json).map_err(|e| conversion_err(14, e))?;

    let requests_json: String = row.get(17)?;
    let client_requests: Vec<String> =
        serde_json::from_str(&requests_json).map_err(|e| conversion_err(17, e))?;

    let cancel_party: Option<String> = row.get(21)?;
    let cancellation = match cancel_party {
        Some(party) => Some(Cancellation {
            party: read_party(&party).map_err(|e| conversion_err(21, e))?,
            reason: row.get(22)?,
        }),
        None => None,
    };

    let source_str: String = row.get(23)?;
    let source: VisitSource = source_str.parse().map_err(|e| conversion_err(23, e))?;

    Ok(VisitAppointment {
        id,
        tenant_id: row.get(1)?,
        client: ClientSnapshot {
            id: row.get(2)?,
            name: row.get(3)?,
            phone: row.get(4)?,
        },
        agent,
        property: PropertySnapshot {
            id: row.get(8)?,
            name: row.get(9)?,
            address: row.get(10)?,
        },
        scheduled_date,
        scheduled_time,
        duration_minutes: row.get(13)?,
        status,
        notes: row.get(16)?,
        client_requests,
        confirmed_by_client: row.get(18)?,
        reminder_enabled: row.get(19)?,
        reminder_sent: row.get(20)?,
        cancellation,
        source,
        created_at: read_timestamp(row, 24)?,
        updated_at: read_timestamp(row, 25)?,
    })
}

fn read_status(
    kind_str: &str,
    result_json: Option<String>,
) -> std::result::Result<VisitStatus, SchedulingError> {
    let kind: VisitStatusKind = kind_str.parse()?;
    let status = match kind {
        VisitStatusKind::Scheduled => VisitStatus::Scheduled,
        VisitStatusKind::Confirmed => VisitStatus::Confirmed,
        VisitStatusKind::InProgress => VisitStatus::InProgress,
        VisitStatusKind::Completed => {
            let json = result_json.ok_or_else(|| {
                SchedulingError::Database("completed visit is missing its result".into())
            })?;
            let result = serde_json::from_str(&json)
                .map_err(|e| SchedulingError::Database(format!("stored result is invalid: {e}")))?;
            VisitStatus::Completed { result }
        }
        VisitStatusKind::CancelledByClient => VisitStatus::CancelledByClient,
        VisitStatusKind::CancelledByAgent => VisitStatus::CancelledByAgent,
        VisitStatusKind::NoShow => VisitStatus::NoShow,
    };
    Ok(status)
}

fn read_party(value: &str) -> std::result::Result<CancellingParty, SchedulingError> {
    match value {
        "client" => Ok(CancellingParty::Client),
        "agent" => Ok(CancellingParty::Agent),
        other => Err(SchedulingError::Database(format!("unknown cancelling party: {other}"))),
    }
}

fn party_str(party: CancellingParty) -> &'static str {
    match party {
        CancellingParty::Client => "client",
        CancellingParty::Agent => "agent",
    }
}

fn read_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
    let secs: i64 = row.get(idx)?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| {
        conversion_err(idx, SchedulingError::Database(format!("timestamp {secs} out of range")))
    })
}

fn time_from_minutes(minutes: i64) -> std::result::Result<NaiveTime, SchedulingError> {
    let in_range = (0..24 * 60).contains(&minutes);
    let hour = u32::try_from(minutes / 60).unwrap_or_default();
    let minute = u32::try_from(minutes % 60).unwrap_or_default();
    if !in_range {
        return Err(SchedulingError::Database(format!("start minute {minutes} out of range")));
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| SchedulingError::Database(format!("start minute {minutes} out of range")))
}

fn conversion_err(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}
