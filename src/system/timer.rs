use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Instant;

use crate::system::Logger;

struct Event {
    when: Instant,
    task: Box<dyn FnOnce() + Send>,
}

struct SchedulerState {
    /// Sorted by due time, latest first, so the next event to fire sits
    /// at the back.
    events: Vec<Event>,
    soft_stop: bool,
    force_stop: bool,
}

struct SchedulerShared {
    state: Mutex<SchedulerState>,
    condition: Condvar,
    log: Logger,
}

/// One thread owning a time ordered heap of delayed tasks.
///
/// Tasks run on the scheduler thread, so they must be short; the
/// typical use is stopping a temp actor when an `ask` or `find`
/// deadline passes.
///
/// Dropping the scheduler is a soft stop: the thread exits once the
/// heap has drained. [`Scheduler::stop`] is a force stop discarding the
/// remaining tasks.
pub(crate) struct Scheduler {
    shared: Arc<SchedulerShared>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Scheduler {
    pub(crate) fn new(log: Logger) -> Scheduler {
        let shared = Arc::new(SchedulerShared {
            state: Mutex::new(SchedulerState {
                events: Vec::new(),
                soft_stop: false,
                force_stop: false,
            }),
            condition: Condvar::new(),
            log,
        });

        let thread_shared = shared.clone();
        let handle = thread::Builder::new()
            .name("yato-scheduler".to_string())
            .spawn(move || scheduler_loop(thread_shared))
            .expect("failed to spawn the scheduler thread");

        Scheduler {
            shared,
            thread: Mutex::new(Some(handle)),
        }
    }

    /// Enqueue a one shot task due at `when`.
    pub(crate) fn enqueue_at(&self, when: Instant, task: impl FnOnce() + Send + 'static) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.force_stop {
                return;
            }
            let event = Event {
                when,
                task: Box::new(task),
            };
            let pos = state.events.partition_point(|e| e.when > event.when);
            state.events.insert(pos, event);
        }
        self.shared.condition.notify_one();
    }

    /// Stop without waiting for the rest of the events.
    pub(crate) fn stop(&self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.force_stop = true;
        }
        self.shared.condition.notify_one();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.soft_stop = true;
        }
        self.shared.condition.notify_one();
        if let Some(handle) = self.thread.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

fn scheduler_loop(shared: Arc<SchedulerShared>) {
    let mut state = shared.state.lock().unwrap();
    loop {
        if state.force_stop {
            return;
        }
        if state.events.is_empty() {
            if state.soft_stop {
                return;
            }
            state = shared.condition.wait(state).unwrap();
            continue;
        }

        let due = state.events.last().unwrap().when;
        let now = Instant::now();
        if due > now {
            let (guard, _) = shared.condition.wait_timeout(state, due - now).unwrap();
            state = guard;
            continue;
        }

        let event = state.events.pop().unwrap();
        drop(state);
        if catch_unwind(AssertUnwindSafe(event.task)).is_err() {
            shared.log.error("scheduler: a timer task panicked");
        }
        state = shared.state.lock().unwrap();
    }
}
