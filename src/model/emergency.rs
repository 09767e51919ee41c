//! Emergency type catalogue: what an emergency needs to be handled.

use super::{Priority, ResponderTypeId};

/// Index into the emergency-type catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct EmergencyTypeId(pub u32);

/// `(type, required_count, time_to_manage_seconds)`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RescuerRequirement {
    pub responder_type: ResponderTypeId,
    pub required_count: u32,
    pub time_to_manage_secs: u64,
}

/// `[Incendio][2]:Pompieri,3,60;Ambulanza,1,40;`
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EmergencyType {
    pub id: EmergencyTypeId,
    pub name: String,
    pub priority: Priority,
    pub requirements: Vec<RescuerRequirement>,
}

impl EmergencyType {
    /// Sum of `required_count` over all requirements.
    pub fn total_required_count(&self) -> u32 {
        self.requirements.iter().map(|r| r.required_count).sum()
    }

    /// Max over requirements of `time_to_manage_secs`; `0` if there are none.
    pub fn total_time_to_manage_secs(&self) -> u64 {
        self.requirements
            .iter()
            .map(|r| r.time_to_manage_secs)
            .max()
            .unwrap_or(0)
    }
}
