//! Data model: catalogue entries, digital twins and event records.

mod emergency;
mod event;
mod request;
mod responder;

pub use emergency::{EmergencyType, EmergencyTypeId, RescuerRequirement};
pub use event::{Assignment, EventId, EventRecord, EventStatus};
pub use request::EmergencyRequest;
pub use responder::{ResponderType, ResponderTypeId, ResponderTwin, TwinId, TwinStatus};

/// Emergency priority tier. Ordinal value doubles as the aging formula's
/// `base_priority` and as the arrive-in-time bound selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum Priority {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Priority {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Priority::Low),
            1 => Some(Priority::Medium),
            2 => Some(Priority::High),
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        self as u8 as f64
    }

    /// Arrive-in-time bound in virtual seconds, `None` meaning unbounded.
    pub fn arrival_bound_secs(self) -> Option<u64> {
        match self {
            Priority::High => Some(10),
            Priority::Medium => Some(30),
            Priority::Low => None,
        }
    }
}

/// An (x, y) grid position.
pub type Position = (i32, i32);

pub fn manhattan(a: Position, b: Position) -> u64 {
    ((a.0 - b.0).unsigned_abs() + (a.1 - b.1).unsigned_abs()) as u64
}
