//! Visit appointment types shared across the workspace.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SchedulingError;

/// Client identity denormalized onto the appointment at creation time.
///
/// These fields are a snapshot: they may drift from the source-of-truth
/// client record, and reconciling them is out of scope for this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Agent identity snapshot, captured when an agent is assigned at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Property identity snapshot, captured at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySnapshot {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// How the appointment entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitSource {
    Manual,
    AiAssisted,
    Other,
}

impl VisitSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::AiAssisted => "ai_assisted",
            Self::Other => "other",
        }
    }
}

impl FromStr for VisitSource {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "ai_assisted" => Ok(Self::AiAssisted),
            "other" => Ok(Self::Other),
            _ => Err(SchedulingError::validation("source", format!("unknown source `{s}`"))),
        }
    }
}

/// Which party cancelled a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellingParty {
    Client,
    Agent,
}

/// Cancellation record attached when a visit reaches a cancelled state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub party: CancellingParty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Follow-up decision recorded with a completed visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    SendProposal,
    ScheduleAnotherVisit,
    NeedsFollowUp,
    NoInterest,
}

/// Qualitative outcome of a completed visit.
///
/// Immutable once recorded; corrections require out-of-band administrative
/// action which this core does not model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitResult {
    pub client_liked: bool,
    pub client_interested: bool,
    pub wants_to_reserve: bool,
    pub follow_up_needed: bool,
    pub next_action: NextAction,
    #[serde(default)]
    pub positive_aspects: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub additional_requests: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_notes: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl VisitResult {
    /// Create an empty result for the given follow-up action, stamped now.
    pub fn new(next_action: NextAction) -> Self {
        Self {
            client_liked: false,
            client_interested: false,
            wants_to_reserve: false,
            follow_up_needed: false,
            next_action,
            positive_aspects: Vec::new(),
            concerns: Vec::new(),
            additional_requests: Vec::new(),
            agent_notes: None,
            completed_at: Utc::now(),
        }
    }
}

/// Visit lifecycle status.
///
/// The completed variant carries the visit result, so "a result exists if
/// and only if the visit is completed" holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed { result: VisitResult },
    CancelledByClient,
    CancelledByAgent,
    NoShow,
}

impl VisitStatus {
    /// The fieldless kind of this status.
    pub fn kind(&self) -> VisitStatusKind {
        match self {
            Self::Scheduled => VisitStatusKind::Scheduled,
            Self::Confirmed => VisitStatusKind::Confirmed,
            Self::InProgress => VisitStatusKind::InProgress,
            Self::Completed { .. } => VisitStatusKind::Completed,
            Self::CancelledByClient => VisitStatusKind::CancelledByClient,
            Self::CancelledByAgent => VisitStatusKind::CancelledByAgent,
            Self::NoShow => VisitStatusKind::NoShow,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind().is_cancelled()
    }

    /// The recorded result, present only for completed visits.
    pub fn result(&self) -> Option<&VisitResult> {
        match self {
            Self::Completed { result } => Some(result),
            _ => None,
        }
    }
}

/// Fieldless mirror of [`VisitStatus`] used in filters, storage columns,
/// and transition error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatusKind {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    CancelledByClient,
    CancelledByAgent,
    NoShow,
}

impl VisitStatusKind {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::CancelledByClient | Self::CancelledByAgent | Self::NoShow
        )
    }

    /// Cancelled states release the slot they occupied.
    pub fn is_cancelled(self) -> bool {
        matches!(self, Self::CancelledByClient | Self::CancelledByAgent)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::CancelledByClient => "cancelled_by_client",
            Self::CancelledByAgent => "cancelled_by_agent",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for VisitStatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatusKind {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled_by_client" => Ok(Self::CancelledByClient),
            "cancelled_by_agent" => Ok(Self::CancelledByAgent),
            "no_show" => Ok(Self::NoShow),
            _ => Err(SchedulingError::validation("status", format!("unknown status `{s}`"))),
        }
    }
}

/// A scheduled property visit, scoped to a single tenant.
///
/// `scheduled_time` is tenant-local wall-clock time; no timezone is stored.
/// Durations that would cross midnight are rejected at validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitAppointment {
    pub id: Uuid,
    pub tenant_id: String,
    pub client: ClientSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<AgentSnapshot>,
    pub property: PropertySnapshot,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration_minutes: u32,
    pub status: VisitStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub client_requests: Vec<String>,
    #[serde(default)]
    pub confirmed_by_client: bool,
    #[serde(default)]
    pub reminder_enabled: bool,
    #[serde(default)]
    pub reminder_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Cancellation>,
    pub source: VisitSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VisitAppointment {
    /// Half-open `[start, end)` interval of the visit on its scheduled date.
    ///
    /// Durations never cross midnight (enforced at validation), so the naive
    /// end-of-interval arithmetic cannot wrap.
    pub fn interval(&self) -> (NaiveTime, NaiveTime) {
        let end = self.scheduled_time + Duration::minutes(i64::from(self.duration_minutes));
        (self.scheduled_time, end)
    }

    /// Half-open interval overlap test: back-to-back visits do not overlap.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        let (own_start, own_end) = self.interval();
        own_start < end && start < own_end
    }
}
