//! Responder allocation, including preemption of lower-priority in-progress
//! events (§4.3).

use std::collections::HashSet;

use crate::config::Config;
use crate::error::{DispatchError, DispatchResult};
use crate::model::{manhattan, EventId, EventStatus, Position, Priority, ResponderTypeId, TwinId, TwinStatus};
use crate::world::SchedulerState;

fn div_ceil(a: u64, b: u64) -> u64 {
    (a + b - 1) / b.max(1)
}

fn arrive_in_time(travel_secs: u64, priority: Priority) -> bool {
    match priority.arrival_bound_secs() {
        Some(bound) => travel_secs <= bound,
        None => true,
    }
}

fn travel_secs(speed: u32, from: Position, to: Position) -> u64 {
    div_ceil(manhattan(from, to), speed.max(1) as u64)
}

enum PlannedUnit {
    Idle { twin: TwinId, origin: Position },
    Preempt { twin: TwinId, donor: EventId, estimate: Position },
}

/// The idle twin of `type_id` minimising travel time to `scene`, subject to
/// the priority's arrive-in-time bound.
fn best_idle(
    state: &SchedulerState,
    config: &Config,
    type_id: ResponderTypeId,
    scene: Position,
    priority: Priority,
    excluded: &HashSet<TwinId>,
) -> Option<(TwinId, Position)> {
    let speed = config
        .responder_types
        .iter()
        .find(|t| t.id == type_id)?
        .effective_speed();

    state
        .twins
        .available_of_type(type_id)
        .filter(|id| !excluded.contains(id))
        .filter_map(|id| {
            let twin = state.twins.get(id)?;
            let t = travel_secs(speed, twin.position, scene);
            arrive_in_time(t, priority).then_some((id, twin.position, t))
        })
        .min_by_key(|(_, _, t)| *t)
        .map(|(id, pos, _)| (id, pos))
}

/// Estimates a donor twin's current position, assuming it moves in
/// Manhattan order (all X, then Y) at its type's speed from `origin`
/// toward the donor event's scene.
fn estimate_position(origin: Position, scene: Position, speed: u32, dt: u64) -> Position {
    let d_moved = dt * speed.max(1) as u64;
    let dx = (scene.0 - origin.0).unsigned_abs() as u64;
    let dy = (scene.1 - origin.1).unsigned_abs() as u64;

    if d_moved >= dx + dy {
        scene
    } else if d_moved >= dx {
        let remaining = d_moved - dx;
        let sign = (scene.1 - origin.1).signum();
        (scene.0, origin.1 + sign * remaining as i32)
    } else {
        let sign = (scene.0 - origin.0).signum();
        (origin.0 + sign * d_moved as i32, origin.1)
    }
}

/// A twin assigned to a strictly-lower-priority in-progress event, whose
/// estimated position allows it to reach the new scene in time.
fn best_preempt(
    state: &SchedulerState,
    config: &Config,
    type_id: ResponderTypeId,
    scene: Position,
    priority: Priority,
    now: u64,
    excluded: &HashSet<TwinId>,
) -> Option<(TwinId, EventId, Position)> {
    let speed = config
        .responder_types
        .iter()
        .find(|t| t.id == type_id)?
        .effective_speed();

    let mut best: Option<(TwinId, EventId, Position, u64)> = None;
    for donor_id in &state.events.in_progress {
        let donor = match state.events.get(*donor_id) {
            Some(e) if e.status == EventStatus::InProgress => e,
            _ => continue,
        };
        if donor.base_priority >= priority {
            continue;
        }
        let dt = now.saturating_sub(donor.starting_time);
        for assignment in &donor.assigned {
            if excluded.contains(&assignment.twin) {
                continue;
            }
            let twin = match state.twins.get(assignment.twin) {
                Some(t) if t.type_id == type_id => t,
                _ => continue,
            };
            let estimate = estimate_position(assignment.origin, donor.scene, speed, dt);
            let t = travel_secs(speed, estimate, scene);
            if !arrive_in_time(t, priority) {
                continue;
            }
            let better = match &best {
                Some((_, _, _, best_t)) => t < *best_t,
                None => true,
            };
            if better {
                best = Some((twin.id, *donor_id, estimate, t));
            }
        }
    }
    best.map(|(twin, donor, estimate, _)| (twin, donor, estimate))
}

/// Total responder count an emergency type's requirements call for.
pub fn required_total(config: &Config, type_id: crate::model::EmergencyTypeId) -> u32 {
    config
        .emergency_types
        .iter()
        .find(|t| t.id == type_id)
        .map(|t| t.total_required_count())
        .unwrap_or(0)
}

/// Plans responders for `needed_per_type` units of `type_id`, each either
/// an idle twin or a preempted one, failing the instant any unit cannot be
/// satisfied. Nothing is mutated until the plan is committed, so a failed
/// plan leaves state untouched — there is nothing to roll back.
fn plan_units(
    state: &SchedulerState,
    config: &Config,
    now: u64,
    scene: Position,
    priority: Priority,
    needed: &[(ResponderTypeId, u32)],
) -> DispatchResult<Vec<PlannedUnit>> {
    let mut plan = Vec::new();
    let mut reserved: HashSet<TwinId> = HashSet::new();

    for (type_id, count) in needed {
        for _ in 0..*count {
            if let Some((twin, origin)) = best_idle(state, config, *type_id, scene, priority, &reserved) {
                reserved.insert(twin);
                plan.push(PlannedUnit::Idle { twin, origin });
                continue;
            }
            if priority > Priority::Low {
                if let Some((twin, donor, estimate)) =
                    best_preempt(state, config, *type_id, scene, priority, now, &reserved)
                {
                    reserved.insert(twin);
                    plan.push(PlannedUnit::Preempt { twin, donor, estimate });
                    continue;
                }
            }
            return Err(DispatchError::AllocationFailed);
        }
    }
    Ok(plan)
}

fn commit_plan(state: &mut SchedulerState, event_id: EventId, plan: Vec<PlannedUnit>) {
    for unit in plan {
        match unit {
            PlannedUnit::Idle { twin, origin } => {
                state.twins.reserve(twin, event_id);
                if let Some(event) = state.events.get_mut(event_id) {
                    event.assigned.push(crate::model::Assignment { twin, origin });
                }
            }
            PlannedUnit::Preempt { twin, donor, estimate } => {
                if let Some(donor_event) = state.events.get_mut(donor) {
                    donor_event.assigned.retain(|a| a.twin != twin);
                    donor_event.preempted = true;
                }
                state.twins.set_status(twin, TwinStatus::EnRouteToScene);
                if let Some(t) = state.twins.get_mut(twin) {
                    t.assigned_event = Some(event_id);
                    t.position = estimate;
                }
                if let Some(event) = state.events.get_mut(event_id) {
                    event.assigned.push(crate::model::Assignment { twin, origin: estimate });
                }
            }
        }
    }
}

/// Attempts to satisfy every requirement of `event_id`'s emergency type
/// from scratch. On success the event is marked `Assigned` and enqueued
/// onto in-progress (still to actually arrive on scene).
pub fn allocate(state: &mut SchedulerState, config: &Config, now: u64, event_id: EventId) -> DispatchResult<()> {
    let (type_id, scene, priority) = {
        let event = state.events.get(event_id).ok_or(DispatchError::AllocationFailed)?;
        (event.type_id, event.scene, event.base_priority)
    };
    let emergency_type = config
        .emergency_types
        .iter()
        .find(|t| t.id == type_id)
        .ok_or(DispatchError::AllocationFailed)?;

    let needed: Vec<_> = emergency_type
        .requirements
        .iter()
        .map(|r| (r.responder_type, r.required_count))
        .collect();
    let plan = plan_units(state, config, now, scene, priority, &needed)?;
    commit_plan(state, event_id, plan);

    if let Some(event) = state.events.get_mut(event_id) {
        event.status = EventStatus::Assigned;
        event.starting_time = now;
    }
    state.events.move_to_in_progress(event_id);

    Ok(())
}

/// Tops up a partially-held event (one that lost responders to
/// preemption) with exactly the units it is still missing. Leaves
/// `status`/`starting_time` untouched; the caller decides what to do with
/// the `preempted` flag and queue membership on success.
pub fn reallocate_missing(state: &mut SchedulerState, config: &Config, now: u64, event_id: EventId) -> DispatchResult<()> {
    let (type_id, scene, priority, held) = {
        let event = state.events.get(event_id).ok_or(DispatchError::AllocationFailed)?;
        (event.type_id, event.scene, event.base_priority, event.assigned.clone())
    };
    let emergency_type = config
        .emergency_types
        .iter()
        .find(|t| t.id == type_id)
        .ok_or(DispatchError::AllocationFailed)?;

    let needed: Vec<_> = emergency_type
        .requirements
        .iter()
        .filter_map(|r| {
            let have = held
                .iter()
                .filter(|a| state.twins.get(a.twin).map(|t| t.type_id) == Some(r.responder_type))
                .count() as u32;
            let missing = r.required_count.saturating_sub(have);
            (missing > 0).then_some((r.responder_type, missing))
        })
        .collect();

    if needed.is_empty() {
        return Ok(());
    }

    let plan = plan_units(state, config, now, scene, priority, &needed)?;
    commit_plan(state, event_id, plan);
    Ok(())
}

/// `max` over assigned twins of travel time from their dispatch origin to
/// the event's scene, used by the worker to decide how long to sleep
/// before the event can transition to `InProgress`.
pub fn max_time_to_scene(state: &SchedulerState, config: &Config, event_id: EventId) -> u64 {
    let Some(event) = state.events.get(event_id) else {
        return 0;
    };
    event
        .assigned
        .iter()
        .filter_map(|a| {
            let twin = state.twins.get(a.twin)?;
            let speed = config
                .responder_types
                .iter()
                .find(|t| t.id == twin.type_id)?
                .effective_speed();
            Some(travel_secs(speed, a.origin, event.scene))
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_stays_on_x_leg_before_turning() {
        let est = estimate_position((0, 0), (10, 10), 1, 4);
        assert_eq!(est, (4, 0));
    }

    #[test]
    fn estimate_turns_onto_y_leg_after_x_leg_complete() {
        let est = estimate_position((0, 0), (10, 10), 1, 13);
        assert_eq!(est, (10, 3));
    }

    #[test]
    fn estimate_caps_at_scene_once_arrived() {
        let est = estimate_position((0, 0), (10, 10), 1, 50);
        assert_eq!(est, (10, 10));
    }

    #[test]
    fn travel_time_rounds_up() {
        assert_eq!(travel_secs(5, (0, 0), (0, 19)), 4);
        assert_eq!(travel_secs(5, (0, 0), (0, 20)), 4);
        assert_eq!(travel_secs(5, (0, 0), (0, 21)), 5);
    }

    #[test]
    fn arrival_bounds_match_priority_tiers() {
        assert!(arrive_in_time(10, Priority::High));
        assert!(!arrive_in_time(11, Priority::High));
        assert!(arrive_in_time(30, Priority::Medium));
        assert!(!arrive_in_time(31, Priority::Medium));
        assert!(arrive_in_time(1_000_000, Priority::Low));
    }
}
