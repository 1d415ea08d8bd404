use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::time::{Duration, Instant};

use crate::kernel::cell::ActorCell;
use crate::system::SystemEnvelope;
use crate::Envelope;

/// A message popped in priority order.
#[derive(Debug)]
#[allow(dead_code)]
pub(crate) enum Popped {
    System(SystemEnvelope),
    User(Envelope),
}

/// Outcome of a non blocking user dequeue attempt.
#[derive(Debug)]
pub(crate) enum UserPop {
    Msg(Envelope),
    /// A system message arrived meanwhile and has to be drained first
    SystemPending,
    Empty,
}

/// Outcome of a blocking fetch on the mailbox condition variable.
pub(crate) enum WaitFetch {
    System(SystemEnvelope),
    User(Envelope),
    /// The mailbox is closed and holds no more system messages
    Closed,
}

struct MailboxState {
    user_queue: VecDeque<Envelope>,
    sys_queue: VecDeque<SystemEnvelope>,
    is_open: bool,
    is_scheduled: bool,
}

impl MailboxState {
    /// A mailbox is eligible for scheduling while it is open and has a
    /// user message, or has any system message regardless of the open
    /// flag.
    fn eligible(&self) -> bool {
        (self.is_open && !self.user_queue.is_empty()) || !self.sys_queue.is_empty()
    }
}

/// Queue pair of a single actor plus its scheduling state.
///
/// One mutex guards both queues and the two flags; the condition
/// variable is notified on every enqueue, schedule change and close so
/// pinned executor threads and inboxes can block on it.
pub struct Mailbox {
    state: Mutex<MailboxState>,
    condition: Condvar,
    cell: Mutex<Weak<ActorCell>>,
    manual: bool,
}

impl Mailbox {
    pub(crate) fn new() -> Arc<Mailbox> {
        Arc::new(Mailbox {
            state: Mutex::new(MailboxState {
                user_queue: VecDeque::new(),
                sys_queue: VecDeque::new(),
                is_open: true,
                is_scheduled: false,
            }),
            condition: Condvar::new(),
            cell: Mutex::new(Weak::new()),
            manual: false,
        })
    }

    /// A mailbox that no executor will ever claim: `is_scheduled` is
    /// pinned true and all messages are fetched manually. Used by
    /// `Inbox`.
    pub(crate) fn new_manual() -> Arc<Mailbox> {
        Arc::new(Mailbox {
            state: Mutex::new(MailboxState {
                user_queue: VecDeque::new(),
                sys_queue: VecDeque::new(),
                is_open: true,
                is_scheduled: true,
            }),
            condition: Condvar::new(),
            cell: Mutex::new(Weak::new()),
            manual: true,
        })
    }

    pub(crate) fn bind(&self, cell: &Arc<ActorCell>) {
        *self.cell.lock().unwrap() = Arc::downgrade(cell);
    }

    pub(crate) fn cell(&self) -> Option<Arc<ActorCell>> {
        self.cell.lock().unwrap().upgrade()
    }

    pub(crate) fn is_manual(&self) -> bool {
        self.manual
    }

    /// Add a message to the user queue.
    ///
    /// Returns true iff the caller must schedule the mailbox. Messages
    /// sent to a closed mailbox are dropped.
    pub(crate) fn enqueue_user(&self, env: Envelope) -> bool {
        let mut state = self.state.lock().unwrap();
        if !state.is_open {
            return false;
        }
        state.user_queue.push_back(env);
        self.condition.notify_one();
        !state.is_scheduled
    }

    /// Add a message to the system queue.
    ///
    /// System messages are accepted even after close so that control
    /// traffic keeps draining until the actor is gone.
    pub(crate) fn enqueue_system(&self, env: SystemEnvelope) -> bool {
        let mut state = self.state.lock().unwrap();
        state.sys_queue.push_back(env);
        self.condition.notify_one();
        !state.is_scheduled
    }

    /// Take the next message in priority order without blocking.
    #[allow(dead_code)]
    pub(crate) fn try_pop(&self) -> Option<Popped> {
        let mut state = self.state.lock().unwrap();
        if let Some(env) = state.sys_queue.pop_front() {
            return Some(Popped::System(env));
        }
        state.user_queue.pop_front().map(Popped::User)
    }

    pub(crate) fn try_pop_system(&self) -> Option<SystemEnvelope> {
        self.state.lock().unwrap().sys_queue.pop_front()
    }

    /// Take the next user message unless a system message is pending.
    pub(crate) fn try_pop_user(&self) -> UserPop {
        let mut state = self.state.lock().unwrap();
        if !state.sys_queue.is_empty() {
            return UserPop::SystemPending;
        }
        match state.user_queue.pop_front() {
            Some(env) => UserPop::Msg(env),
            None => UserPop::Empty,
        }
    }

    /// Block until a message can be popped in priority order.
    ///
    /// With `accept_user == false` only system messages are fetched;
    /// user traffic stays queued until the actor has started.
    pub(crate) fn wait_fetch(&self, accept_user: bool) -> WaitFetch {
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(env) = state.sys_queue.pop_front() {
                return WaitFetch::System(env);
            }
            if !state.is_open {
                return WaitFetch::Closed;
            }
            if accept_user {
                if let Some(env) = state.user_queue.pop_front() {
                    return WaitFetch::User(env);
                }
            }
            state = self.condition.wait(state).unwrap();
        }
    }

    /// Block until a user message arrives or the timeout expires. Used
    /// only by `Inbox`; system messages are ignored.
    pub(crate) fn pop_user_blocking(&self, timeout: Duration) -> Option<Envelope> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        loop {
            if let Some(env) = state.user_queue.pop_front() {
                return Some(env);
            }
            if !state.is_open {
                return None;
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            let (guard, _) = self
                .condition
                .wait_timeout(state, deadline - now)
                .unwrap();
            state = guard;
        }
    }

    /// Claim the mailbox for one executor task.
    ///
    /// Returns true iff the caller has become responsible for draining
    /// it. While claimed, `is_scheduled` stays set and every other
    /// attempt fails.
    pub(crate) fn try_claim(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if !state.is_scheduled && state.eligible() {
            state.is_scheduled = true;
            true
        } else {
            false
        }
    }

    /// End of an executor batch: keep the claim if the mailbox is still
    /// eligible, otherwise release it.
    ///
    /// With `ignore_user == true` only the system queue counts, which
    /// is the case while the actor has not started yet.
    pub(crate) fn finish_batch(&self, ignore_user: bool) -> bool {
        let mut state = self.state.lock().unwrap();
        let keep = if ignore_user {
            !state.sys_queue.is_empty()
        } else {
            state.eligible()
        };
        if !keep {
            state.is_scheduled = false;
        }
        keep
    }

    pub(crate) fn clear_scheduled(&self) {
        let mut state = self.state.lock().unwrap();
        state.is_scheduled = false;
        self.condition.notify_all();
    }

    /// Close the mailbox and release the executor claim in one step.
    pub(crate) fn close_and_release(&self) {
        let mut state = self.state.lock().unwrap();
        state.is_open = false;
        state.is_scheduled = false;
        self.condition.notify_all();
    }

    /// Close the mailbox for new user messages.
    pub(crate) fn close(&self) {
        let mut state = self.state.lock().unwrap();
        state.is_open = false;
        self.condition.notify_all();
    }

    pub(crate) fn notify(&self) {
        self.condition.notify_all();
    }

    /// Hand the mailbox to the executor of its cell unless it is
    /// already claimed.
    pub(crate) fn schedule_for_execution(self: &Arc<Self>) {
        if let Some(cell) = self.cell() {
            cell.execution().executor.execute(self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorRef;
    use crate::system::SystemMsg;
    use crate::AnyMessage;

    fn system_envelope(msg: SystemMsg, sender: ActorRef) -> SystemEnvelope {
        SystemEnvelope { msg, sender }
    }

    fn envelope(n: i32) -> Envelope {
        Envelope {
            msg: AnyMessage::new(n),
            sender: ActorRef::default(),
        }
    }

    #[test]
    fn enqueue_reports_schedule_need_once() {
        let mbox = Mailbox::new();
        assert!(mbox.enqueue_user(envelope(1)));
        assert!(mbox.try_claim());
        assert!(!mbox.enqueue_user(envelope(2)));
    }

    #[test]
    fn closed_mailbox_drops_user_messages() {
        let mbox = Mailbox::new();
        mbox.close();
        assert!(!mbox.enqueue_user(envelope(1)));
        assert!(matches!(mbox.try_pop_user(), UserPop::Empty));
    }

    #[test]
    fn system_messages_take_priority() {
        let mbox = Mailbox::new();
        mbox.enqueue_user(envelope(1));
        mbox.enqueue_system(system_envelope(SystemMsg::Stop, ActorRef::default()));
        assert!(matches!(mbox.try_pop(), Some(Popped::System(_))));
        assert!(matches!(mbox.try_pop(), Some(Popped::User(_))));
    }

    #[test]
    fn user_pop_defers_to_system_queue() {
        let mbox = Mailbox::new();
        mbox.enqueue_user(envelope(1));
        mbox.enqueue_system(system_envelope(SystemMsg::Stop, ActorRef::default()));
        assert!(matches!(mbox.try_pop_user(), UserPop::SystemPending));
    }

    #[test]
    fn claim_is_exclusive_until_released() {
        let mbox = Mailbox::new();
        mbox.enqueue_user(envelope(1));
        assert!(mbox.try_claim());
        assert!(!mbox.try_claim());
        assert!(matches!(mbox.try_pop_user(), UserPop::Msg(_)));
        assert!(!mbox.finish_batch(false));
        mbox.enqueue_user(envelope(2));
        assert!(mbox.try_claim());
    }

    #[test]
    fn manual_mailbox_is_never_claimable() {
        let mbox = Mailbox::new_manual();
        mbox.enqueue_user(envelope(1));
        assert!(!mbox.try_claim());
    }

    #[test]
    fn blocking_pop_times_out_empty() {
        let mbox = Mailbox::new();
        let popped = mbox.pop_user_blocking(Duration::from_millis(20));
        assert!(popped.is_none());
    }
}
