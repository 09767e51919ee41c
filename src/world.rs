//! The mutable scheduler state: the twin table, the three event queues and
//! the shutdown/counter bookkeeping. Everything here lives behind the
//! scheduler's single mutex (see `scheduler::Scheduler`); there is no
//! locking inside this module itself.

use std::collections::{BTreeSet, HashMap};

use crate::config::Config;
use crate::model::{EventId, EventRecord, EventStatus, ResponderTypeId, ResponderTwin, TwinId, TwinStatus};

/// Owns every responder digital twin and the free list per responder type.
#[derive(Debug, Default)]
pub struct TwinTable {
    twins: HashMap<TwinId, ResponderTwin>,
    available: HashMap<ResponderTypeId, BTreeSet<TwinId>>,
}

impl TwinTable {
    pub fn insert(&mut self, twin: ResponderTwin) {
        self.available.entry(twin.type_id).or_default().insert(twin.id);
        self.twins.insert(twin.id, twin);
    }

    pub fn get(&self, id: TwinId) -> Option<&ResponderTwin> {
        self.twins.get(&id)
    }

    pub fn get_mut(&mut self, id: TwinId) -> Option<&mut ResponderTwin> {
        self.twins.get_mut(&id)
    }

    /// Idle twins of a given type, in ascending id order.
    pub fn available_of_type(&self, type_id: ResponderTypeId) -> impl Iterator<Item = TwinId> + '_ {
        self.available.get(&type_id).into_iter().flatten().copied()
    }

    /// Reserves an idle twin for dispatch: moves it out of the free list and
    /// marks it en-route. Caller must have already verified `id` was idle.
    /// A missing twin is an internal invariant violation (queue/twin-table
    /// desync): it aborts in debug builds and is logged and skipped in
    /// release rather than panicking.
    pub fn reserve(&mut self, id: TwinId, event: EventId) {
        let Some(twin) = self.twins.get_mut(&id) else {
            debug_assert!(false, "reserve: twin {id:?} not found in twin table");
            tracing::error!(target: "world", twin = id.0, "reserve: missing twin, skipping");
            return;
        };
        twin.status = TwinStatus::EnRouteToScene;
        twin.assigned_event = Some(event);
        if let Some(set) = self.available.get_mut(&twin.type_id) {
            set.remove(&id);
        }
    }

    /// Returns a held twin to the free list as idle, at `position`.
    pub fn release(&mut self, id: TwinId, position: (i32, i32)) {
        if let Some(twin) = self.twins.get_mut(&id) {
            twin.status = TwinStatus::Idle;
            twin.assigned_event = None;
            twin.position = position;
            self.available.entry(twin.type_id).or_default().insert(id);
        }
    }

    pub fn set_status(&mut self, id: TwinId, status: TwinStatus) {
        if let Some(twin) = self.twins.get_mut(&id) {
            twin.status = status;
        }
    }

    pub fn len(&self) -> usize {
        self.twins.len()
    }

    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        let mut ids: Vec<_> = self.twins.keys().copied().collect();
        ids.sort();
        for id in ids {
            let t = &self.twins[&id];
            out.push_str(&format!(
                "twin {} type={:?} pos={:?} status={:?} event={:?}\n",
                id.0, t.type_id.0, t.position, t.status, t.assigned_event
            ));
        }
        out
    }
}

/// Owns every non-terminal event record and the three queues they move
/// through. Terminal events are removed entirely rather than archived,
/// matching the "destroyed on terminal transition" lifecycle (§3).
#[derive(Debug, Default)]
pub struct EventTable {
    events: HashMap<EventId, EventRecord>,
    pub waiting: Vec<EventId>,
    pub in_progress: Vec<EventId>,
    pub paused: Vec<EventId>,
}

impl EventTable {
    pub fn insert_waiting(&mut self, event: EventRecord) {
        let id = event.id;
        self.events.insert(id, event);
        self.waiting.push(id);
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.events.get(&id)
    }

    pub fn get_mut(&mut self, id: EventId) -> Option<&mut EventRecord> {
        self.events.get_mut(&id)
    }

    /// Removes `id` from whichever of the three queues it is currently in.
    pub fn remove_from_queue(&mut self, id: EventId) {
        self.waiting.retain(|e| *e != id);
        self.in_progress.retain(|e| *e != id);
        self.paused.retain(|e| *e != id);
    }

    /// Destroys a terminal event record after its responders are released.
    pub fn finalize(&mut self, id: EventId, status: EventStatus) {
        debug_assert!(status.is_terminal());
        self.remove_from_queue(id);
        self.events.remove(&id);
    }

    pub fn move_to_in_progress(&mut self, id: EventId) {
        self.waiting.retain(|e| *e != id);
        self.paused.retain(|e| *e != id);
        if !self.in_progress.contains(&id) {
            self.in_progress.push(id);
        }
    }

    pub fn move_to_paused(&mut self, id: EventId) {
        self.in_progress.retain(|e| *e != id);
        if !self.paused.contains(&id) {
            self.paused.push(id);
        }
    }

    pub fn move_to_waiting(&mut self, id: EventId) {
        self.in_progress.retain(|e| *e != id);
        self.paused.retain(|e| *e != id);
        if !self.waiting.contains(&id) {
            self.waiting.push(id);
        }
    }

    pub fn total_non_terminal(&self) -> usize {
        self.events.len()
    }
}

/// Everything guarded by the scheduler's single monitor.
pub struct SchedulerState {
    pub twins: TwinTable,
    pub events: EventTable,
    pub shutdown: bool,
    pub emergencies_solved: u64,
    pub emergencies_not_solved: u64,
    pub admitted: u64,
    pub rejected: u64,
    next_event_id: u64,
    next_seq: u64,
}

impl SchedulerState {
    pub fn new(config: &Config) -> Self {
        let mut twins = TwinTable::default();
        let mut next_twin_id = 1u64;
        for rt in &config.responder_types {
            for _ in 0..rt.fleet_size {
                let twin = ResponderTwin::new(TwinId(next_twin_id), rt.id, rt.base);
                next_twin_id += 1;
                twins.insert(twin);
            }
        }

        Self {
            twins,
            events: EventTable::default(),
            shutdown: false,
            emergencies_solved: 0,
            emergencies_not_solved: 0,
            admitted: 0,
            rejected: 0,
            next_event_id: 1,
            next_seq: 0,
        }
    }

    pub fn next_event_id(&mut self) -> EventId {
        let id = EventId(self.next_event_id);
        self.next_event_id += 1;
        id
    }

    pub fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}
