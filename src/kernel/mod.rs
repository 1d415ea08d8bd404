pub(crate) mod cell;
mod executor;
pub(crate) mod mailbox;

pub use self::cell::Context;
pub use self::executor::{ExecutionContext, Executor, PinnedExecutor, ThreadPoolExecutor};
pub use self::mailbox::Mailbox;
