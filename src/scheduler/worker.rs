//! The rescuer worker loop (§4.4): pick, allocate, travel, manage, release.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::model::{EventId, EventStatus};
use crate::scheduler::{allocation, priority, Scheduler};

const TAG: &str = "worker";

/// How long a worker waits on `rescuer_available` before re-checking the
/// waiting queue and a paused event it already owns, when nothing woke it
/// explicitly.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One worker's run loop. Each worker may, at any moment, own at most one
/// previously-preempted event it is waiting to resume; that ownership is
/// purely local to the thread, not reflected in shared state beyond the
/// event's `Paused` status.
pub fn run(sched: Arc<Scheduler>, worker_id: usize) {
    let mut resuming: Option<EventId> = None;

    loop {
        let event_id = {
            let mut state = sched.state.lock();
            if state.shutdown && state.events.waiting.is_empty() && resuming.is_none() {
                debug!(target: TAG, worker_id, "exiting on shutdown");
                return;
            }

            if let Some(id) = resuming.take() {
                let now = sched.clock.now();
                match allocation::reallocate_missing(&mut state, &sched.config, now, id) {
                    Ok(()) => {
                        if let Some(event) = state.events.get_mut(id) {
                            event.preempted = false;
                            event.status = EventStatus::Assigned;
                        }
                        state.events.move_to_in_progress(id);
                        Some(id)
                    }
                    Err(_) => {
                        resuming = Some(id);
                        sched.rescuer_available.wait_for(&mut state, POLL_INTERVAL);
                        None
                    }
                }
            } else if let Some(id) = priority::pick_highest_priority(&mut state) {
                let now = sched.clock.now();
                match allocation::allocate(&mut state, &sched.config, now, id) {
                    Ok(()) => Some(id),
                    Err(_) => {
                        state.events.move_to_waiting(id);
                        sched.event_available.wait_for(&mut state, POLL_INTERVAL);
                        None
                    }
                }
            } else {
                sched.event_available.wait_for(&mut state, POLL_INTERVAL);
                None
            }
        };

        let Some(event_id) = event_id else { continue };

        if let Some(next) = manage(&sched, worker_id, event_id) {
            resuming = Some(next);
        }
    }
}

/// Drives one event from "responders dispatched" through to a terminal
/// outcome or a pause. Returns `Some(event_id)` if the event was paused by
/// preemption and this worker should try to resume it.
fn manage(sched: &Arc<Scheduler>, worker_id: usize, event_id: EventId) -> Option<EventId> {
    let travel = {
        let state = sched.state.lock();
        allocation::max_time_to_scene(&state, &sched.config, event_id)
    };
    sched.clock.sleep(travel);

    {
        let mut state = sched.state.lock();
        let twins: Vec<_> = state
            .events
            .get(event_id)
            .map(|e| e.assigned.iter().map(|a| a.twin).collect())
            .unwrap_or_default();
        for twin in twins {
            state.twins.set_status(twin, crate::model::TwinStatus::OnScene);
        }
        if let Some(event) = state.events.get_mut(event_id) {
            if event.status == EventStatus::Assigned {
                event.status = EventStatus::InProgress;
            }
        }
        info!(target: TAG, worker_id, event = event_id.0, "on scene");
    }

    loop {
        sched.clock.sleep(1);

        let mut state = sched.state.lock();
        let Some(event) = state.events.get(event_id) else {
            return None;
        };

        if event.preempted {
            crate::scheduler::aging::pause(&mut state, event_id);
            drop(state);
            debug!(target: TAG, worker_id, event = event_id.0, "paused by preemption");
            return Some(event_id);
        }

        let remaining = event.time_remaining;
        if remaining == 0 {
            release_and_complete(&mut state, event_id);
            drop(state);
            sched.rescuer_available.notify_all();
            sched.event_available.notify_all();
            return None;
        }

        if let Some(event) = state.events.get_mut(event_id) {
            event.time_remaining -= 1;
        }
        drop(state);
    }
}

fn release_and_complete(state: &mut crate::world::SchedulerState, event_id: EventId) {
    let (held, scene) = match state.events.get(event_id) {
        Some(event) => (
            event.assigned.iter().map(|a| a.twin).collect::<Vec<_>>(),
            event.scene,
        ),
        None => return,
    };
    for twin in held {
        state.twins.release(twin, scene);
    }
    if let Some(event) = state.events.get_mut(event_id) {
        event.status = EventStatus::Completed;
    }
    state.events.finalize(event_id, EventStatus::Completed);
    state.emergencies_solved += 1;
    info!(target: TAG, event = event_id.0, "completed");
}
