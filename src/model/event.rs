//! Event records: the scheduler's unit of work, from admission to a
//! terminal transition.

use super::{EmergencyTypeId, Position, Priority, TwinId};

/// Unique, monotonically increasing identifier for an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EventId(pub u64);

/// Lifecycle state of an event record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EventStatus {
    Waiting,
    Assigned,
    InProgress,
    Paused,
    Completed,
    Canceled,
    Timeout,
}

impl EventStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            EventStatus::Completed | EventStatus::Canceled | EventStatus::Timeout
        )
    }
}

/// A responder held by an event, together with the position it departed
/// from when dispatched. The origin is needed to estimate a donor's
/// current position during preemption (§4.3): the donor is assumed
/// frozen along its Manhattan path rather than tracked continuously.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Assignment {
    pub twin: TwinId,
    pub origin: Position,
}

/// The scheduler's internal representation of an admitted emergency
/// request through its entire lifecycle.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub type_id: EmergencyTypeId,
    pub status: EventStatus,
    pub scene: Position,
    /// Virtual-time admission timestamp.
    pub time: u64,
    /// Insertion sequence number, the final waiting-queue tie-break.
    pub seq: u64,
    pub assigned: Vec<Assignment>,
    pub total_time_to_manage: u64,
    pub time_remaining: u64,
    pub base_priority: Priority,
    pub current_priority: f64,
    /// Seconds accumulated while not `InProgress`.
    pub timeout: u64,
    pub preempted: bool,
    /// Virtual time at which the event transitioned to `Assigned`.
    pub starting_time: u64,
}
