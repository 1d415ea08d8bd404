use std::fmt;

use crate::actor::{Actor, BoxActor};

/// A captured actor constructor.
///
/// The closure runs on the creating thread when the cell is built, so
/// it may move non clonable state (for example a one shot channel) into
/// the actor.
///
/// ```
/// use yato::actors::*;
///
/// struct Echo;
///
/// impl Actor for Echo {
///     fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
///         ctx.sender().tell_any(msg, Some(ctx.myself().clone()));
///     }
/// }
///
/// let props = Props::new(|| Echo);
/// ```
pub struct Props {
    producer: Box<dyn FnOnce() -> BoxActor + Send>,
    executor: Option<String>,
}

impl Props {
    pub fn new<A, F>(creator: F) -> Props
    where
        A: Actor + 'static,
        F: FnOnce() -> A + Send + 'static,
    {
        Props {
            producer: Box::new(move || Box::new(creator()) as BoxActor),
            executor: None,
        }
    }

    /// Run the actor on the named execution context instead of the
    /// system default.
    pub fn with_executor(mut self, name: impl Into<String>) -> Props {
        self.executor = Some(name.into());
        self
    }

    pub(crate) fn executor(&self) -> Option<&str> {
        self.executor.as_deref()
    }

    pub(crate) fn produce(self) -> BoxActor {
        (self.producer)()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.executor {
            Some(name) => write!(f, "Props[executor={}]", name),
            None => f.write_str("Props"),
        }
    }
}
