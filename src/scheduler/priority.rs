//! Highest-priority selection over the waiting queue (§4.2).

use crate::world::SchedulerState;
use crate::model::EventId;

/// Removes and returns the highest-current-priority waiting event,
/// breaking ties by earliest admission timestamp and then by insertion
/// order. Returns `None` if the waiting queue is empty.
pub fn pick_highest_priority(state: &mut SchedulerState) -> Option<EventId> {
    let best = state
        .events
        .waiting
        .iter()
        .copied()
        .filter_map(|id| state.events.get(id).map(|ev| (id, ev.current_priority, ev.time, ev.seq)))
        .max_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.2.cmp(&a.2)) // earlier timestamp wins
                .then_with(|| b.3.cmp(&a.3)) // earlier insertion wins
        })
        .map(|(id, ..)| id);

    if let Some(id) = best {
        state.events.waiting.retain(|e| *e != id);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{EmergencyTypeId, EventRecord, EventStatus, Priority};

    fn make_event(state: &mut SchedulerState, priority: f64, time: u64) -> EventId {
        let id = state.next_event_id();
        let seq = state.next_seq();
        state.events.insert_waiting(EventRecord {
            id,
            type_id: EmergencyTypeId(0),
            status: EventStatus::Waiting,
            scene: (0, 0),
            time,
            seq,
            assigned: Vec::new(),
            total_time_to_manage: 10,
            time_remaining: 10,
            base_priority: Priority::Low,
            current_priority: priority,
            timeout: 0,
            preempted: false,
            starting_time: 0,
        });
        id
    }

    fn empty_config() -> Config {
        Config {
            responder_types: Vec::new(),
            emergency_types: Vec::new(),
            environment: crate::config::EnvironmentConfig::default(),
        }
    }

    #[test]
    fn picks_highest_priority_first() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let low = make_event(&mut state, 0.5, 0);
        let high = make_event(&mut state, 2.0, 1);

        let picked = pick_highest_priority(&mut state).unwrap();
        assert_eq!(picked, high);
        assert!(!state.events.waiting.contains(&high));
        assert!(state.events.waiting.contains(&low));
    }

    #[test]
    fn ties_break_by_earliest_timestamp_then_insertion_order() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        let first = make_event(&mut state, 1.0, 5);
        let second = make_event(&mut state, 1.0, 5);

        let picked = pick_highest_priority(&mut state).unwrap();
        assert_eq!(picked, first);
    }

    #[test]
    fn empty_waiting_queue_returns_none() {
        let cfg = empty_config();
        let mut state = SchedulerState::new(&cfg);
        assert!(pick_highest_priority(&mut state).is_none());
    }
}
