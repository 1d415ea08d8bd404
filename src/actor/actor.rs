use crate::kernel::Context;
use crate::AnyMessage;

/// A consumer of messages. The active element of an actor's behavior
/// stack; the actor itself is the base entry.
pub trait Receive: Send {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage);
}

pub type BoxBehavior = Box<dyn Receive>;

/// Base trait for actors.
///
/// All hooks run on executor threads, one message at a time per actor;
/// inside a hook there is no concurrency with respect to the owning
/// actor. Panics escaping a hook are caught by the runtime: a panic in
/// `pre_start` stops the actor, a panic in `receive` discards the
/// message and keeps the actor running, a panic in `post_stop` is
/// logged and shutdown continues.
pub trait Actor: Send {
    /// Invoked before the first message.
    fn pre_start(&mut self, _ctx: &mut Context) {}

    /// Main method for processing all incoming messages.
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage);

    /// Invoked after the last message.
    fn post_stop(&mut self, _ctx: &mut Context) {}
}

/// The actor trait object
pub type BoxActor = Box<dyn Actor>;

struct FnBehavior<F> {
    consumer: F,
}

impl<F> Receive for FnBehavior<F>
where
    F: FnMut(&mut Context, AnyMessage) + Send,
{
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        (self.consumer)(ctx, msg)
    }
}

/// Create a behavior from a closure, for use with
/// [`Context::become_behavior`].
pub fn behavior<F>(consumer: F) -> BoxBehavior
where
    F: FnMut(&mut Context, AnyMessage) + Send + 'static,
{
    Box::new(FnBehavior { consumer })
}
