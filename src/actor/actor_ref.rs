use std::any::Any;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context as PollContext, Poll};
use std::time::Duration;

use futures::channel::oneshot;
use futures::executor::block_on;

use crate::actor::ActorPath;
use crate::kernel::Mailbox;
use crate::system::system::SystemHandle;
use crate::AnyMessage;

/// A lightweight handle of an actor.
///
/// The reference bundles the actor path, a weak link to the mailbox and
/// a back reference to the owning system. Cloning is cheap; equality is
/// path equality.
///
/// An empty reference corresponds to no actor at all: it is returned by
/// failed lookups and messaging it is a no-op counted as a dead letter.
/// Once the underlying actor stops, existing references behave the same
/// way.
#[derive(Clone)]
pub struct ActorRef {
    path: ActorPath,
    system: SystemHandle,
    mailbox: Weak<Mailbox>,
}

impl ActorRef {
    pub(crate) fn new(path: ActorPath, system: SystemHandle, mailbox: Weak<Mailbox>) -> ActorRef {
        ActorRef {
            path,
            system,
            mailbox,
        }
    }

    /// A reference not corresponding to any actor.
    pub fn empty() -> ActorRef {
        ActorRef {
            path: ActorPath::from_string(""),
            system: SystemHandle::detached(),
            mailbox: Weak::new(),
        }
    }

    /// True if this reference was never attached to a system.
    pub fn is_empty(&self) -> bool {
        self.path.as_str().is_empty()
    }

    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    /// Actor name, unique among siblings.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub(crate) fn mailbox(&self) -> Option<Arc<Mailbox>> {
        self.mailbox.upgrade()
    }

    /// Send a message to the actor.
    ///
    /// Without an explicit sender the message arrives with the system's
    /// dead letters reference as sender.
    pub fn tell<T>(&self, msg: T, sender: impl Into<Option<ActorRef>>)
    where
        T: Any + Send,
    {
        self.tell_any(AnyMessage::new(msg), sender.into());
    }

    /// Send an already erased message.
    pub fn tell_any(&self, msg: AnyMessage, sender: Option<ActorRef>) {
        if let Some(system) = self.system.upgrade() {
            let sender = sender.unwrap_or_else(|| system.dead_letters().clone());
            system.send_user(self, sender, msg);
        }
    }

    /// Send a message expecting a reply.
    ///
    /// A short lived temp actor captures the first reply; if nothing
    /// arrives within the timeout the future resolves to an empty
    /// message.
    pub fn ask<T>(&self, msg: T, timeout: Duration) -> Ask
    where
        T: Any + Send,
    {
        match self.system.upgrade() {
            Some(system) => system.ask_any(self, AnyMessage::new(msg), timeout),
            None => Ask::ready_empty(),
        }
    }

    /// Register `watcher` for a `Terminated` notification of this
    /// actor. If the actor is already gone the notification is sent
    /// immediately.
    pub fn watch(&self, watcher: &ActorRef) {
        if let Some(system) = self.system.upgrade() {
            system.watch(self, watcher);
        }
    }

    pub fn unwatch(&self, watcher: &ActorRef) {
        if let Some(system) = self.system.upgrade() {
            system.unwatch(self, watcher);
        }
    }

    /// Stop the actor right after the message it is currently
    /// processing.
    pub fn stop(&self) {
        if let Some(system) = self.system.upgrade() {
            system.stop(self);
        }
    }
}

impl Default for ActorRef {
    fn default() -> ActorRef {
        ActorRef::empty()
    }
}

impl PartialEq for ActorRef {
    fn eq(&self, other: &ActorRef) -> bool {
        self.path == other.path
    }
}

impl Eq for ActorRef {}

impl Hash for ActorRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl fmt::Debug for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ActorRef[{}]", self.path)
    }
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ActorRef[{}]", self.path)
    }
}

/// Future of an `ask` reply.
///
/// Resolves to the first reply sent to the temp asker, or to an empty
/// [`AnyMessage`] when the deadline passed first. Never fails.
pub struct Ask {
    rx: Option<oneshot::Receiver<AnyMessage>>,
}

impl Ask {
    pub(crate) fn new(rx: oneshot::Receiver<AnyMessage>) -> Ask {
        Ask { rx: Some(rx) }
    }

    pub(crate) fn ready_empty() -> Ask {
        Ask { rx: None }
    }

    /// Block the calling thread until the reply or the timeout.
    pub fn wait(self) -> AnyMessage {
        block_on(self)
    }
}

impl Future for Ask {
    type Output = AnyMessage;

    fn poll(mut self: Pin<&mut Self>, cx: &mut PollContext<'_>) -> Poll<Self::Output> {
        match self.rx.as_mut() {
            None => Poll::Ready(AnyMessage::empty()),
            Some(rx) => Pin::new(rx)
                .poll(cx)
                .map(|reply| reply.unwrap_or_else(|_| AnyMessage::empty())),
        }
    }
}

impl fmt::Debug for Ask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Ask")
    }
}

/// Future of a `find` lookup.
///
/// Resolves to the reference of the selected actor, or to an empty
/// reference when the path does not exist or the timeout passed.
pub struct Find {
    rx: Option<oneshot::Receiver<ActorRef>>,
}

impl Find {
    pub(crate) fn new(rx: oneshot::Receiver<ActorRef>) -> Find {
        Find { rx: Some(rx) }
    }

    pub(crate) fn ready_empty() -> Find {
        Find { rx: None }
    }

    /// Block the calling thread until the lookup settles.
    pub fn wait(self) -> ActorRef {
        block_on(self)
    }
}

impl Future for Find {
    type Output = ActorRef;

    fn poll(mut self: Pin<&mut Self>, cx: &mut PollContext<'_>) -> Poll<Self::Output> {
        match self.rx.as_mut() {
            None => Poll::Ready(ActorRef::empty()),
            Some(rx) => Pin::new(rx)
                .poll(cx)
                .map(|found| found.unwrap_or_else(|_| ActorRef::empty())),
        }
    }
}

impl fmt::Debug for Find {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Find")
    }
}
