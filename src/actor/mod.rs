mod actor;
mod actor_ref;
pub(crate) mod asking;
mod inbox;
pub mod io;
mod path;
mod props;
pub(crate) mod selection;

pub use self::actor::{behavior, Actor, BoxActor, BoxBehavior, Receive};
pub use self::actor_ref::{ActorRef, Ask, Find};
pub use self::inbox::Inbox;
pub use self::path::{ActorPath, ActorScope, PathElements};
pub use self::props::Props;
pub use self::selection::{SelectionFailure, SelectionSuccess};
