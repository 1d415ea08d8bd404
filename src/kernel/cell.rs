use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::actor::{ActorRef, BoxActor, BoxBehavior, Props};
use crate::kernel::executor::ExecutionContext;
use crate::kernel::mailbox::Mailbox;
use crate::system::system::SystemHandle;
use crate::system::{ActorSystem, Logger, PoisonPill, SystemMsg, Terminated};
use crate::{AnyMessage, Envelope, Result};

/// Outcome of processing one system message.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ProcessResult {
    KeepRunning,
    /// The cell has terminated itself; the executor must close the
    /// mailbox and notify the system.
    RequestStop,
}

enum BehaviorEntry {
    /// The actor itself
    Base,
    Custom(BoxBehavior),
}

pub(crate) enum BehaviorCmd {
    Become(BoxBehavior, bool),
    Unbecome,
}

struct CellState {
    actor: BoxActor,
    /// Non empty stack of message consumers; the top entry is active.
    behaviors: Vec<BehaviorEntry>,
    started: bool,
    stop_pending: bool,
    terminated: bool,
    watchers: Vec<ActorRef>,
    parent: Option<ActorRef>,
    children: Vec<Arc<ActorCell>>,
}

/// Per actor node of the supervision tree.
///
/// The cell owns the actor instance and its mailbox and records the
/// tree links. All mutable state sits behind one mutex which is only
/// ever taken by the single executor task draining the mailbox, so
/// dispatch never contends on it.
pub struct ActorCell {
    system: SystemHandle,
    myself: ActorRef,
    mailbox: Arc<Mailbox>,
    execution: Arc<ExecutionContext>,
    log: Logger,
    state: Mutex<CellState>,
}

impl ActorCell {
    pub(crate) fn new(
        system: &ActorSystem,
        path: crate::actor::ActorPath,
        execution: Arc<ExecutionContext>,
        actor: BoxActor,
    ) -> Arc<ActorCell> {
        let mailbox = Mailbox::new();
        let handle = system.handle();
        let myself = ActorRef::new(path.clone(), handle.clone(), Arc::downgrade(&mailbox));
        let log = system.logger().scoped(format!("Actor[{}]", path.name()));

        let cell = Arc::new(ActorCell {
            system: handle,
            myself,
            mailbox,
            execution,
            log,
            state: Mutex::new(CellState {
                actor,
                behaviors: vec![BehaviorEntry::Base],
                started: false,
                stop_pending: false,
                terminated: false,
                watchers: Vec::new(),
                parent: None,
                children: Vec::new(),
            }),
        });
        cell.mailbox.bind(&cell);
        cell
    }

    pub(crate) fn myself(&self) -> &ActorRef {
        &self.myself
    }

    pub(crate) fn execution(&self) -> &Arc<ExecutionContext> {
        &self.execution
    }

    pub(crate) fn is_started(&self) -> bool {
        self.state.lock().unwrap().started
    }

    pub(crate) fn set_parent(&self, parent: ActorRef) {
        self.state.lock().unwrap().parent = Some(parent);
    }

    /// Dispatch one user message to the active behavior.
    pub(crate) fn process_user_message(&self, env: Envelope) {
        let Envelope { msg, sender } = env;

        if msg.is::<PoisonPill>() {
            self.myself.stop();
            return;
        }

        let system = match self.system.upgrade() {
            Some(system) => system,
            None => return,
        };

        let mut state = self.state.lock().unwrap();
        let mut ctx = Context::new(&self.myself, sender, system, &self.log);

        let state_ref = &mut *state;
        let actor = &mut state_ref.actor;
        let hook = match state_ref.behaviors.last_mut() {
            Some(BehaviorEntry::Custom(behavior)) => {
                catch_unwind(AssertUnwindSafe(|| behavior.receive(&mut ctx, msg)))
            }
            _ => catch_unwind(AssertUnwindSafe(|| actor.receive(&mut ctx, msg))),
        };
        if hook.is_err() {
            self.log
                .error("actor[receive]: Unhandled panic, the message is dropped");
        }

        for cmd in ctx.commands.drain(..) {
            self.apply_behavior_cmd(state_ref, cmd);
        }
    }

    fn apply_behavior_cmd(&self, state: &mut CellState, cmd: BehaviorCmd) {
        match cmd {
            BehaviorCmd::Become(behavior, discard_old) => {
                if discard_old {
                    *state.behaviors.last_mut().unwrap() = BehaviorEntry::Custom(behavior);
                } else {
                    state.behaviors.push(BehaviorEntry::Custom(behavior));
                }
            }
            BehaviorCmd::Unbecome => {
                if state.behaviors.len() <= 1 {
                    self.log.error(
                        "failed to perform unbecome(): the behavior stack has only one element",
                    );
                } else {
                    state.behaviors.pop();
                }
            }
        }
    }

    pub(crate) fn system(&self) -> Option<ActorSystem> {
        self.system.upgrade()
    }

    /// Run the lifecycle state machine for one system message.
    pub(crate) fn process_system_message(
        &self,
        env: crate::system::SystemEnvelope,
    ) -> ProcessResult {
        let system = match self.system.upgrade() {
            Some(system) => system,
            None => return ProcessResult::KeepRunning,
        };

        let mut state = self.state.lock().unwrap();

        match env.msg {
            SystemMsg::Start => {
                if state.started {
                    return ProcessResult::KeepRunning;
                }
                let mut ctx = Context::new(
                    &self.myself,
                    system.dead_letters().clone(),
                    system.clone(),
                    &self.log,
                );
                let state_ref = &mut *state;
                let actor = &mut state_ref.actor;
                let hook = catch_unwind(AssertUnwindSafe(|| actor.pre_start(&mut ctx)));
                for cmd in ctx.commands.drain(..) {
                    self.apply_behavior_cmd(state_ref, cmd);
                }
                match hook {
                    Ok(()) => {
                        state.started = true;
                        self.log
                            .verbose(format!("Started ({})", self.myself.path()));
                    }
                    Err(_) => {
                        self.log
                            .error("actor[pre_start]: Unhandled panic, stopping the actor");
                        self.myself.stop();
                    }
                }
                ProcessResult::KeepRunning
            }

            SystemMsg::Stop => {
                if state.terminated {
                    return ProcessResult::KeepRunning;
                }
                if state.children.is_empty() {
                    self.stop_impl(&mut state, &system);
                    ProcessResult::RequestStop
                } else {
                    // Wait for the children, asking them to finish
                    state.stop_pending = true;
                    for child in &state.children {
                        child.myself().tell(PoisonPill, Some(self.myself.clone()));
                    }
                    ProcessResult::KeepRunning
                }
            }

            SystemMsg::StopAfterChildren => {
                if state.terminated {
                    return ProcessResult::KeepRunning;
                }
                if state.children.is_empty() {
                    self.stop_impl(&mut state, &system);
                    ProcessResult::RequestStop
                } else {
                    state.stop_pending = true;
                    ProcessResult::KeepRunning
                }
            }

            SystemMsg::Watch(watcher) => {
                if state.terminated {
                    // Too late to register, report right away
                    watcher.tell(Terminated(self.myself.clone()), Some(self.myself.clone()));
                } else if !state.watchers.contains(&watcher) {
                    state.watchers.push(watcher);
                }
                ProcessResult::KeepRunning
            }

            SystemMsg::Unwatch(watcher) => {
                state.watchers.retain(|w| w != &watcher);
                ProcessResult::KeepRunning
            }

            SystemMsg::AttachChild(child) => {
                if state.stop_pending {
                    self.log
                        .warning("Child can't be attached. Actor is going to stop.");
                    return ProcessResult::KeepRunning;
                }
                child.set_parent(self.myself.clone());
                let child_ref = child.myself().clone();
                state.children.push(child);
                system.send_system(&child_ref, SystemMsg::Start, &self.myself);
                self.log
                    .verbose(format!("Attached child {}", child_ref.path()));
                ProcessResult::KeepRunning
            }

            SystemMsg::DetachChild(child_ref) => {
                state.children.retain(|c| c.myself() != &child_ref);
                self.log
                    .verbose(format!("Detached child {}", child_ref.path()));
                if state.stop_pending && state.children.is_empty() {
                    self.stop_impl(&mut state, &system);
                    ProcessResult::RequestStop
                } else {
                    ProcessResult::KeepRunning
                }
            }

            SystemMsg::Selection(mut selection) => {
                if state.terminated {
                    selection.sender.tell(
                        crate::actor::SelectionFailure(
                            "Selection target is not found.".to_string(),
                        ),
                        Some(self.myself.clone()),
                    );
                } else if selection.path.is_empty() {
                    // Reached the path's end
                    selection.sender.tell(
                        crate::actor::SelectionSuccess(self.myself.clone()),
                        Some(self.myself.clone()),
                    );
                } else {
                    let next = selection.path.pop().unwrap();
                    let child = state
                        .children
                        .iter()
                        .find(|c| c.myself().path().name() == next);
                    match child {
                        Some(child) => {
                            let child_ref = child.myself().clone();
                            system.send_system(
                                &child_ref,
                                SystemMsg::Selection(selection),
                                &self.myself,
                            );
                        }
                        None => {
                            selection.sender.tell(
                                crate::actor::SelectionFailure(
                                    "Selection target is not found.".to_string(),
                                ),
                                Some(self.myself.clone()),
                            );
                        }
                    }
                }
                ProcessResult::KeepRunning
            }
        }
    }

    /// Terminate this cell: run `post_stop`, notify watchers and detach
    /// from the parent.
    fn stop_impl(&self, state: &mut CellState, system: &ActorSystem) {
        if state.started {
            let mut ctx = Context::new(
                &self.myself,
                system.dead_letters().clone(),
                system.clone(),
                &self.log,
            );
            let actor = &mut state.actor;
            if catch_unwind(AssertUnwindSafe(|| actor.post_stop(&mut ctx))).is_err() {
                self.log.error("actor[post_stop]: Unhandled panic");
            }
        }
        state.started = false;
        state.terminated = true;
        self.log.verbose(format!("Stopped ({})", self.myself.path()));

        for watcher in state.watchers.drain(..) {
            watcher.tell(Terminated(self.myself.clone()), Some(self.myself.clone()));
        }

        if let Some(parent) = &state.parent {
            system.send_system(parent, SystemMsg::DetachChild(self.myself.clone()), &self.myself);
        }
    }
}

impl std::fmt::Debug for ActorCell {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ActorCell[{}]", self.myself.path())
    }
}

/// Hook context established by the runtime before dispatch.
///
/// Grants an actor access to its own reference, the sender of the
/// current message and the system, and collects behavior stack
/// requests which take effect when the hook returns.
pub struct Context<'a> {
    myself: &'a ActorRef,
    sender: ActorRef,
    system: ActorSystem,
    log: &'a Logger,
    pub(crate) commands: Vec<BehaviorCmd>,
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        myself: &'a ActorRef,
        sender: ActorRef,
        system: ActorSystem,
        log: &'a Logger,
    ) -> Context<'a> {
        Context {
            myself,
            sender,
            system,
            log,
            commands: Vec::new(),
        }
    }

    /// Reference of the actor being dispatched.
    pub fn myself(&self) -> &ActorRef {
        self.myself
    }

    /// Sender of the current message; dead letters when the message was
    /// sent without an explicit sender.
    pub fn sender(&self) -> &ActorRef {
        &self.sender
    }

    pub fn system(&self) -> &ActorSystem {
        &self.system
    }

    pub fn log(&self) -> &Logger {
        self.log
    }

    /// Create a child of this actor.
    pub fn actor_of(&self, props: Props, name: &str) -> Result<ActorRef> {
        self.system.create_child(self.myself, name, props)
    }

    /// Start watching another actor. If the watchee does not exist a
    /// `Terminated` is sent immediately.
    pub fn watch(&self, watchee: &ActorRef) {
        self.system.watch(watchee, self.myself);
    }

    pub fn unwatch(&self, watchee: &ActorRef) {
        self.system.unwatch(watchee, self.myself);
    }

    /// Send a message to `target` keeping the original sender.
    pub fn forward(&self, msg: AnyMessage, target: &ActorRef) {
        target.tell_any(msg, Some(self.sender.clone()));
    }

    /// Replace the actor's behavior.
    ///
    /// With `discard_old` the top of the behavior stack is rewritten,
    /// otherwise the new behavior is pushed on top of it. The change
    /// applies from the next message on.
    pub fn become_behavior(&mut self, behavior: BoxBehavior, discard_old: bool) {
        self.commands.push(BehaviorCmd::Become(behavior, discard_old));
    }

    /// Remove the behavior on the top of the stack. Removing the last
    /// entry is refused and logged.
    pub fn unbecome(&mut self) {
        self.commands.push(BehaviorCmd::Unbecome);
    }

    pub fn stop(&self, actor: &ActorRef) {
        self.system.stop(actor);
    }
}
