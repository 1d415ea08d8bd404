pub(crate) mod root;
mod logger;
pub(crate) mod system;
mod timer;

use std::sync::Arc;

use crate::actor::ActorRef;
use crate::kernel::cell::ActorCell;

pub use self::logger::{LogLevel, Logger};
pub use self::system::{ActorSystem, ExecutorConfig, ExecutorKind, SystemConfig};

/// Control plane messages, processed with priority over user messages.
pub(crate) enum SystemMsg {
    /// First message an actor gets. Invokes `pre_start`.
    Start,

    /// Terminate the actor. Poison pills are broadcast to its children
    /// first if it has any.
    Stop,

    /// Terminate once no children are left. Children are not told to
    /// stop.
    StopAfterChildren,

    /// Add a watcher
    Watch(ActorRef),

    /// Remove a watcher
    Unwatch(ActorRef),

    /// Attach a new child cell to the addressee
    AttachChild(Arc<ActorCell>),

    /// Remove a stopped child and destroy its cell
    DetachChild(ActorRef),

    /// Walk the actors tree searching for a path
    Selection(Selection),
}

pub(crate) struct SystemEnvelope {
    pub msg: SystemMsg,
    pub sender: ActorRef,
}

impl std::fmt::Debug for SystemEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self.msg {
            SystemMsg::Start => "Start",
            SystemMsg::Stop => "Stop",
            SystemMsg::StopAfterChildren => "StopAfterChildren",
            SystemMsg::Watch(_) => "Watch",
            SystemMsg::Unwatch(_) => "Unwatch",
            SystemMsg::AttachChild(_) => "AttachChild",
            SystemMsg::DetachChild(_) => "DetachChild",
            SystemMsg::Selection(_) => "Selection",
        };
        write!(f, "SystemEnvelope[{}]", name)
    }
}

/// Path walk state for `find`. The remaining segments are kept
/// reversed so the next one to match is popped off the back.
pub(crate) struct Selection {
    pub sender: ActorRef,
    pub path: Vec<String>,
}

/// Graceful stop marker.
///
/// When observed as a user payload the runtime does not dispatch it to
/// `receive`; the actor is stopped right after the messages queued
/// before the pill.
#[derive(Debug, Clone, Copy)]
pub struct PoisonPill;

/// Sent to every watcher of a stopped actor, exactly once.
#[derive(Debug, Clone)]
pub struct Terminated(pub ActorRef);
