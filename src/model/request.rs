//! Intake record: a raw, not-yet-admitted emergency request.

use super::Position;

/// `(name, x, y, timestamp)` as decoded off the wire.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmergencyRequest {
    pub name: String,
    pub position: Position,
    /// Virtual-time admission timestamp (ticks since scheduler start).
    pub timestamp: u64,
}
