//! Request admission (§4.1): validate, build an event record, enqueue it.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{DispatchError, DispatchResult};
use crate::model::{EmergencyRequest, EventId, EventRecord, EventStatus};
use crate::world::SchedulerState;

const TAG: &str = "admission";

pub fn submit(
    state: &mut SchedulerState,
    config: &Config,
    request: EmergencyRequest,
) -> DispatchResult<EventId> {
    if state.shutdown {
        warn!(target: TAG, name = %request.name, "rejected: shutting down");
        state.rejected += 1;
        return Err(DispatchError::ShuttingDown);
    }

    let (x, y) = request.position;
    if !config.is_within_bounds(x, y) {
        warn!(target: TAG, x, y, "rejected: out of bounds");
        state.rejected += 1;
        return Err(DispatchError::OutOfBounds { x, y });
    }

    let emergency_type = match config.find_emergency_type(&request.name) {
        Some(t) => t,
        None => {
            warn!(target: TAG, name = %request.name, "rejected: unknown emergency type");
            state.rejected += 1;
            return Err(DispatchError::UnknownType(request.name));
        }
    };

    let id = state.next_event_id();
    let seq = state.next_seq();
    let total_time_to_manage = emergency_type.total_time_to_manage_secs();

    state.events.insert_waiting(EventRecord {
        id,
        type_id: emergency_type.id,
        status: EventStatus::Waiting,
        scene: request.position,
        time: request.timestamp,
        seq,
        assigned: Vec::new(),
        total_time_to_manage,
        time_remaining: total_time_to_manage,
        base_priority: emergency_type.priority,
        current_priority: emergency_type.priority.as_f64(),
        timeout: 0,
        preempted: false,
        starting_time: 0,
    });
    state.admitted += 1;

    info!(target: TAG, event = id.0, name = %emergency_type.name, x, y, "admitted");
    Ok(id)
}
