use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use crate::actor::{ActorPath, ActorRef, ActorScope};
use crate::kernel::Mailbox;
use crate::system::ActorSystem;
use crate::validate::validate_actor_name;
use crate::{AnyMessage, Result};

/// An actor shaped synchronous sink for non actor code.
///
/// The inbox owns a mailbox that no executor ever claims; messages sent
/// to its reference are fetched manually with [`Inbox::receive`].
/// Replies to messages sent through [`Inbox::send`] come back into the
/// inbox. The inbox ref cannot be looked up with `find` and the inbox
/// itself cannot be watched, but it can watch other actors.
pub struct Inbox {
    mailbox: Arc<Mailbox>,
    myself: ActorRef,
}

impl Inbox {
    pub fn new(system: &ActorSystem, name: &str) -> Result<Inbox> {
        validate_actor_name(name)?;
        let path = ActorPath::new(
            system.name(),
            ActorScope::System,
            &format!("mailbox_{}", name),
        )?;
        let mailbox = Mailbox::new_manual();
        let myself = ActorRef::new(path, system.handle(), Arc::downgrade(&mailbox));
        Ok(Inbox { mailbox, myself })
    }

    /// The reference to address messages to this inbox.
    pub fn actor_ref(&self) -> &ActorRef {
        &self.myself
    }

    /// Take the next payload, waiting up to `timeout`. Returns the
    /// empty message when the wait expires.
    pub fn receive(&self, timeout: Duration) -> AnyMessage {
        match self.mailbox.pop_user_blocking(timeout) {
            Some(envelope) => envelope.msg,
            None => AnyMessage::empty(),
        }
    }

    /// Send `msg` to `target` with this inbox as the sender, so replies
    /// land back here.
    pub fn send<T>(&self, target: &ActorRef, msg: T)
    where
        T: Any + Send,
    {
        target.tell(msg, Some(self.myself.clone()));
    }

    /// Have the inbox watch an actor; its `Terminated` arrives as a
    /// regular payload.
    pub fn watch(&self, watchee: &ActorRef) {
        watchee.watch(&self.myself);
    }
}
