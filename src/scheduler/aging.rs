//! Pause, timeout and priority aging (§4.5).

use tracing::{debug, info};

use crate::model::{EventId, EventStatus};
use crate::world::SchedulerState;

const TAG: &str = "aging";

/// Moves an in-progress event whose responders were stolen into `Paused`,
/// marking it preempted so the owning worker knows to try reallocation.
pub fn pause(state: &mut SchedulerState, event_id: EventId) {
    if let Some(event) = state.events.get_mut(event_id) {
        event.status = EventStatus::Paused;
        event.preempted = true;
    }
    state.events.move_to_paused(event_id);
    debug!(target: TAG, event = event_id.0, "paused");
}

/// Terminates an event that could not be serviced within its deadline:
/// releases any (partially) held responders back to idle and destroys the
/// record.
pub fn timeout(state: &mut SchedulerState, event_id: EventId) {
    let held: Vec<_> = match state.events.get(event_id) {
        Some(event) => event.assigned.iter().map(|a| (a.twin, a.origin)).collect(),
        None => return,
    };
    for (twin, origin) in held {
        state.twins.release(twin, origin);
    }
    if let Some(event) = state.events.get_mut(event_id) {
        event.status = EventStatus::Timeout;
    }
    state.events.finalize(event_id, EventStatus::Timeout);
    state.emergencies_not_solved += 1;
    info!(target: TAG, event = event_id.0, "timed out");
}

/// Runs one virtual second of aging: every waiting or paused event's
/// timeout counter advances and its current priority is recomputed; events
/// past their priority-dependent deadline are timed out. In-progress
/// events are untouched — they neither age nor time out.
pub fn age_tick(state: &mut SchedulerState) {
    let candidates: Vec<EventId> = state
        .events
        .waiting
        .iter()
        .chain(state.events.paused.iter())
        .copied()
        .collect();

    let mut to_timeout = Vec::new();
    for id in candidates {
        let Some(event) = state.events.get_mut(id) else {
            continue;
        };
        event.timeout += 1;
        event.current_priority =
            event.base_priority.as_f64() + (event.timeout as f64 / 9.0).cbrt();

        if let Some(deadline) = event.base_priority.arrival_bound_secs() {
            if event.timeout > deadline {
                to_timeout.push(id);
            }
        }
    }

    for id in to_timeout {
        timeout(state, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EnvironmentConfig};
    use crate::model::{EmergencyTypeId, EventRecord, Priority};

    fn empty_config() -> Config {
        Config {
            responder_types: Vec::new(),
            emergency_types: Vec::new(),
            environment: EnvironmentConfig::default(),
        }
    }

    fn waiting_event(state: &mut SchedulerState, base_priority: Priority) -> EventId {
        let id = state.next_event_id();
        let seq = state.next_seq();
        state.events.insert_waiting(EventRecord {
            id,
            type_id: EmergencyTypeId(0),
            status: EventStatus::Waiting,
            scene: (0, 0),
            time: 0,
            seq,
            assigned: Vec::new(),
            total_time_to_manage: 10,
            time_remaining: 10,
            base_priority,
            current_priority: base_priority.as_f64(),
            timeout: 0,
            preempted: false,
            starting_time: 0,
        });
        id
    }

    #[test]
    fn aging_raises_priority_monotonically() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let id = waiting_event(&mut state, Priority::Low);

        let mut last = state.events.get(id).unwrap().current_priority;
        for _ in 0..8 {
            age_tick(&mut state);
            let next = state.events.get(id).unwrap().current_priority;
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn base_zero_event_exceeds_priority_one_after_nine_seconds() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let id = waiting_event(&mut state, Priority::Low);
        for _ in 0..9 {
            age_tick(&mut state);
        }
        let current = state.events.get(id).unwrap().current_priority;
        assert!(current > Priority::Medium.as_f64());
    }

    #[test]
    fn high_priority_event_times_out_after_ten_seconds() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let id = waiting_event(&mut state, Priority::High);
        for _ in 0..10 {
            age_tick(&mut state);
        }
        assert!(state.events.get(id).is_some());
        age_tick(&mut state);
        assert!(state.events.get(id).is_none());
        assert_eq!(state.emergencies_not_solved, 1);
    }

    #[test]
    fn low_priority_event_never_times_out() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let id = waiting_event(&mut state, Priority::Low);
        for _ in 0..1000 {
            age_tick(&mut state);
        }
        assert!(state.events.get(id).is_some());
    }
}
