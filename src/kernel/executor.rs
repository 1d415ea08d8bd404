use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};
use std::thread;

use futures::executor::ThreadPool;

use crate::kernel::cell::ProcessResult;
use crate::kernel::mailbox::{Mailbox, UserPop, WaitFetch};
use crate::system::Logger;
use crate::{Error, Result};

/// Transforms scheduled mailboxes into actor hook invocations on
/// threads.
///
/// `execute` is called whenever an enqueue made a mailbox eligible; the
/// implementation claims the mailbox and drains it on one of its
/// threads. At most one task per mailbox is ever active.
pub trait Executor: Send + Sync {
    /// Run the full mailbox or a part of it.
    /// Returns false in the case of error.
    fn execute(&self, mbox: &Arc<Mailbox>) -> bool;
}

/// A named executor shared by many cells.
pub struct ExecutionContext {
    pub name: String,
    pub(crate) executor: Box<dyn Executor>,
}

impl ExecutionContext {
    pub(crate) fn thread_pool(
        name: &str,
        threads: usize,
        throughput: u32,
        log: &Logger,
    ) -> Result<ExecutionContext> {
        let threads = if threads == 0 { num_cpus::get() } else { threads };
        let executor = ThreadPoolExecutor::new(name, threads, throughput, log)?;
        Ok(ExecutionContext {
            name: name.to_string(),
            executor: Box::new(executor),
        })
    }

    pub(crate) fn pinned(name: &str, threads_limit: usize, log: &Logger) -> Result<ExecutionContext> {
        Ok(ExecutionContext {
            name: name.to_string(),
            executor: Box::new(PinnedExecutor::new(name, threads_limit, log)),
        })
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ExecutionContext[{}]", self.name)
    }
}

/// Work stealing pool executor. Mailboxes are drained in batches
/// bounded by the throughput parameter, then handed back to the pool
/// while still eligible.
pub struct ThreadPoolExecutor {
    pool: ThreadPool,
    throughput: u32,
    log: Logger,
}

impl ThreadPoolExecutor {
    pub(crate) fn new(name: &str, threads: usize, throughput: u32, log: &Logger) -> Result<Self> {
        let pool = ThreadPool::builder()
            .pool_size(threads)
            .name_prefix(format!("{}-", name))
            .create()
            .map_err(|e| Error::Runtime(format!("failed to start the executor pool: {}", e)))?;
        Ok(ThreadPoolExecutor {
            pool,
            throughput: throughput.max(1),
            log: log.scoped(format!("executor[{}]", name)),
        })
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, mbox: &Arc<Mailbox>) -> bool {
        if mbox.is_manual() {
            self.log.warning("A manual mailbox cannot be executed");
            return false;
        }
        if mbox.try_claim() {
            let pool = self.pool.clone();
            let mbox = mbox.clone();
            let throughput = self.throughput;
            self.pool
                .spawn_ok(async move { run_batch(pool, mbox, throughput) });
        }
        true
    }
}

/// One pool task: system messages first, then up to `throughput` user
/// messages, then reschedule or release under the mailbox lock.
fn run_batch(pool: ThreadPool, mbox: Arc<Mailbox>, throughput: u32) {
    let cell = match mbox.cell() {
        Some(cell) => cell,
        None => {
            mbox.clear_scheduled();
            return;
        }
    };

    let mut ignore_user = false;
    let mut count = 0u32;

    loop {
        let mut stop_requested = false;
        while let Some(env) = mbox.try_pop_system() {
            if cell.process_system_message(env) == ProcessResult::RequestStop {
                stop_requested = true;
                break;
            }
        }
        if stop_requested {
            mbox.close_and_release();
            // Control messages that raced the stop, e.g. a late watch,
            // still get answered
            while let Some(env) = mbox.try_pop_system() {
                cell.process_system_message(env);
            }
            if let Some(system) = cell.system() {
                system.notify_on_stop(cell.myself());
            }
            return;
        }

        if !cell.is_started() {
            // No user messages until the start signal went through
            ignore_user = true;
            break;
        }
        if count >= throughput {
            break;
        }

        match mbox.try_pop_user() {
            UserPop::SystemPending => continue,
            UserPop::Empty => break,
            UserPop::Msg(env) => {
                cell.process_user_message(env);
                count += 1;
            }
        }
    }

    if mbox.finish_batch(ignore_user) {
        let next_pool = pool.clone();
        let next_mbox = mbox.clone();
        pool.spawn_ok(async move { run_batch(next_pool, next_mbox, throughput) });
    }
}

/// One dedicated OS thread per mailbox, created lazily on the first
/// `execute`. Threads block on the mailbox condition variable and live
/// until their actor stops or the mailbox is closed.
pub struct PinnedExecutor {
    threads_limit: usize,
    log: Logger,
    threads: Mutex<Vec<thread::JoinHandle<()>>>,
    mailboxes: Mutex<Vec<Weak<Mailbox>>>,
}

impl PinnedExecutor {
    pub(crate) fn new(name: &str, threads_limit: usize, log: &Logger) -> Self {
        PinnedExecutor {
            threads_limit: threads_limit.max(1),
            log: log.scoped(format!("executor[{}]", name)),
            threads: Mutex::new(Vec::new()),
            mailboxes: Mutex::new(Vec::new()),
        }
    }
}

impl Executor for PinnedExecutor {
    fn execute(&self, mbox: &Arc<Mailbox>) -> bool {
        if mbox.is_manual() {
            self.log.warning("A manual mailbox cannot be executed");
            return false;
        }
        if mbox.try_claim() {
            let mut threads = self.threads.lock().unwrap();
            if threads.len() >= self.threads_limit {
                self.log.warning(format!(
                    "Pinned thread count is above the limit of {}",
                    self.threads_limit
                ));
            }
            let thread_mbox = mbox.clone();
            let thread_log = self.log.clone();
            let spawned = thread::Builder::new()
                .name("yato-pinned".to_string())
                .spawn(move || pinned_loop(thread_mbox, thread_log));
            match spawned {
                Ok(handle) => {
                    threads.push(handle);
                    self.mailboxes.lock().unwrap().push(Arc::downgrade(mbox));
                }
                Err(e) => {
                    self.log
                        .error(format!("Failed to spawn a pinned thread: {}", e));
                    mbox.clear_scheduled();
                    return false;
                }
            }
        }
        // Wake the thread in case it is parked on the condition
        mbox.notify();
        true
    }
}

fn pinned_loop(mbox: Arc<Mailbox>, log: Logger) {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let cell = match mbox.cell() {
            Some(cell) => cell,
            None => {
                mbox.clear_scheduled();
                return;
            }
        };
        loop {
            match mbox.wait_fetch(cell.is_started()) {
                WaitFetch::System(env) => {
                    if cell.process_system_message(env) == ProcessResult::RequestStop {
                        mbox.close_and_release();
                        while let Some(env) = mbox.try_pop_system() {
                            cell.process_system_message(env);
                        }
                        if let Some(system) = cell.system() {
                            system.notify_on_stop(cell.myself());
                        }
                        return;
                    }
                }
                WaitFetch::User(env) => cell.process_user_message(env),
                WaitFetch::Closed => {
                    mbox.clear_scheduled();
                    return;
                }
            }
        }
    }));
    if outcome.is_err() {
        log.error("pinned executor thread failed with a panic");
        mbox.clear_scheduled();
    }
}

impl Drop for PinnedExecutor {
    fn drop(&mut self) {
        // Closing the mailboxes releases threads that are still parked
        for mbox in self.mailboxes.lock().unwrap().drain(..) {
            if let Some(mbox) = mbox.upgrade() {
                mbox.close();
            }
        }
        for handle in self.threads.lock().unwrap().drain(..) {
            let _ = handle.join();
        }
    }
}
