//! The scheduler: config, shared state behind a single mutex, two
//! condition variables and the worker/aging threads built on top of them
//! (§5).

mod admission;
mod aging;
mod allocation;
mod priority;
mod worker;

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::info;

use crate::clock::VirtualClock;
use crate::config::Config;
use crate::error::DispatchResult;
use crate::model::{EmergencyRequest, EventId};
use crate::world::SchedulerState;

const TAG: &str = "scheduler";

/// Final admitted/solved/not-solved/rejected tallies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counters {
    pub admitted: u64,
    pub solved: u64,
    pub not_solved: u64,
    pub rejected: u64,
}

/// The scheduler core: one mutex guarding all mutable state, two condition
/// variables signalling new work (`event_available`) and freed responders
/// (`rescuer_available`), and the static configuration and clock shared
/// read-only across threads.
pub struct Scheduler {
    pub(crate) config: Config,
    pub(crate) clock: VirtualClock,
    pub(crate) state: Mutex<SchedulerState>,
    pub(crate) event_available: Condvar,
    pub(crate) rescuer_available: Condvar,
}

impl Scheduler {
    pub fn new(config: Config, clock: VirtualClock) -> Arc<Self> {
        let state = Mutex::new(SchedulerState::new(&config));
        Arc::new(Self {
            config,
            clock,
            state,
            event_available: Condvar::new(),
            rescuer_available: Condvar::new(),
        })
    }

    /// Admits a request (§4.1), waking a worker to consider it.
    pub fn submit(&self, request: EmergencyRequest) -> DispatchResult<EventId> {
        let mut state = self.state.lock();
        let id = admission::submit(&mut state, &self.config, request)?;
        drop(state);
        self.event_available.notify_one();
        Ok(id)
    }

    /// Signals shutdown: no further admissions succeed and workers drain
    /// the waiting queue, then exit.
    pub fn request_shutdown(&self) {
        let mut state = self.state.lock();
        state.shutdown = true;
        drop(state);
        self.event_available.notify_all();
        self.rescuer_available.notify_all();
        info!(target: TAG, "shutdown requested");
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }

    pub fn counters(&self) -> Counters {
        let state = self.state.lock();
        Counters {
            admitted: state.admitted,
            solved: state.emergencies_solved,
            not_solved: state.emergencies_not_solved,
            rejected: state.rejected,
        }
    }

    /// The full in-memory twin table, for diagnostics. Also emits a
    /// `status`-tagged log line, matching the other subsystem-tagged
    /// events listed in spec §6.
    pub fn debug_dump(&self) -> String {
        let dump = self.state.lock().twins.debug_dump();
        info!(target: "status", twins = dump.lines().count(), "debug dump requested");
        dump
    }
}

/// Handles to the worker and aging threads spawned for a `Scheduler`.
pub struct SchedulerHandles {
    workers: Vec<JoinHandle<()>>,
    aging: JoinHandle<()>,
}

impl SchedulerHandles {
    pub fn join(self) {
        for worker in self.workers {
            let _ = worker.join();
        }
        let _ = self.aging.join();
    }
}

/// Spawns `worker_count` dispatch workers plus one aging thread, all
/// sharing `sched`.
pub fn spawn(sched: Arc<Scheduler>, worker_count: usize) -> SchedulerHandles {
    let workers = (0..worker_count)
        .map(|id| {
            let sched = Arc::clone(&sched);
            std::thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || worker::run(sched, id))
                .expect("failed to spawn worker thread")
        })
        .collect();

    let aging_sched = Arc::clone(&sched);
    let aging = std::thread::Builder::new()
        .name("aging".to_string())
        .spawn(move || aging_loop(aging_sched))
        .expect("failed to spawn aging thread");

    SchedulerHandles { workers, aging }
}

/// Runs `aging::age_tick` once per virtual second until shutdown, notifying
/// `rescuer_available` whenever a tick released responders via timeout.
fn aging_loop(sched: Arc<Scheduler>) {
    loop {
        {
            let state = sched.state.lock();
            if state.shutdown {
                return;
            }
        }
        sched.clock.sleep(1);

        let mut state = sched.state.lock();
        if state.shutdown {
            return;
        }
        let before = state.emergencies_not_solved;
        aging::age_tick(&mut state);
        let released = state.emergencies_not_solved != before;
        drop(state);

        if released {
            sched.rescuer_available.notify_all();
        }
    }
}
