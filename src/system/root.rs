use std::sync::Arc;

use crate::actor::{Actor, ActorRef, ActorScope};
use crate::kernel::cell::ActorCell;
use crate::kernel::Context;
use crate::system::{SystemMsg, Terminated};
use crate::AnyMessage;

/// Hand a freshly built cell to the root for routing into the guardian
/// of its scope.
pub(crate) struct RootAdd(pub(crate) Arc<ActorCell>);

/// Begin the system shutdown. With `force` the user and remote
/// subtrees are stopped outright; otherwise they are drained first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RootTerminate {
    pub(crate) force: bool,
}

/// Scope guardian. Root of the user, system, temp and remote subtrees;
/// its only job is holding children.
struct Guardian;

impl Actor for Guardian {
    fn receive(&mut self, _ctx: &mut Context, _msg: AnyMessage) {}
}

/// The fixed top of the supervision tree.
///
/// Owns the four scope guardians and drives orderly shutdown: user and
/// remote actors go down first, system and temp guardians follow, and
/// once those are gone the root stops itself which unblocks
/// `ActorSystem::shutdown`.
pub(crate) struct Root {
    usr_guard: ActorRef,
    sys_guard: ActorRef,
    tmp_guard: ActorRef,
    rmt_guard: ActorRef,
    usr_stopped: bool,
    sys_stopped: bool,
    tmp_stopped: bool,
    rmt_stopped: bool,
}

impl Root {
    pub(crate) fn new() -> Root {
        Root {
            usr_guard: ActorRef::empty(),
            sys_guard: ActorRef::empty(),
            tmp_guard: ActorRef::empty(),
            rmt_guard: ActorRef::empty(),
            usr_stopped: false,
            sys_stopped: false,
            tmp_stopped: false,
            rmt_stopped: false,
        }
    }

    fn create_guard(&self, ctx: &Context, scope: ActorScope) -> ActorRef {
        let path = ctx.myself().path().join(scope.as_str());
        let cell = ActorCell::new(
            ctx.system(),
            path,
            ctx.system().default_execution(),
            Box::new(Guardian),
        );
        let guard = cell.myself().clone();

        ctx.log().debug(format!("Guard {} is created.", guard.path()));
        ctx.system()
            .send_system(ctx.myself(), SystemMsg::AttachChild(cell), ctx.myself());

        guard
    }
}

impl Actor for Root {
    fn pre_start(&mut self, ctx: &mut Context) {
        self.sys_guard = self.create_guard(ctx, ActorScope::System);
        ctx.watch(&self.sys_guard);
        self.sys_stopped = false;

        self.tmp_guard = self.create_guard(ctx, ActorScope::Temp);
        ctx.watch(&self.tmp_guard);
        self.tmp_stopped = false;

        self.usr_guard = self.create_guard(ctx, ActorScope::User);
        ctx.watch(&self.usr_guard);
        self.usr_stopped = false;

        self.rmt_guard = self.create_guard(ctx, ActorScope::Remote);
        ctx.watch(&self.rmt_guard);
        self.rmt_stopped = false;
    }

    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        let msg = match msg.downcast::<RootAdd>() {
            Ok(RootAdd(cell)) => {
                let elems = match cell.myself().path().parse_header() {
                    Ok(elems) => elems,
                    Err(_) => {
                        ctx.log()
                            .error(format!("Invalid actor path: {}", cell.myself().path()));
                        return;
                    }
                };

                ctx.log().verbose(format!("Adding {}", cell.myself().path()));

                let guard = match elems.scope {
                    ActorScope::User => &self.usr_guard,
                    ActorScope::System => &self.sys_guard,
                    ActorScope::Temp => &self.tmp_guard,
                    ActorScope::Remote => &self.rmt_guard,
                    _ => {
                        ctx.log().error("root: invalid scope!");
                        return;
                    }
                };
                ctx.system()
                    .send_system(guard, SystemMsg::AttachChild(cell), ctx.myself());
                return;
            }
            Err(msg) => msg,
        };

        let msg = match msg.downcast::<RootTerminate>() {
            Ok(RootTerminate { force }) => {
                ctx.log().debug("Terminating root");
                let msg = if force {
                    SystemMsg::Stop
                } else {
                    SystemMsg::StopAfterChildren
                };
                ctx.system().send_system(&self.usr_guard, msg, ctx.myself());
                let msg = if force {
                    SystemMsg::Stop
                } else {
                    SystemMsg::StopAfterChildren
                };
                ctx.system().send_system(&self.rmt_guard, msg, ctx.myself());
                return;
            }
            Err(msg) => msg,
        };

        match msg.downcast::<Terminated>() {
            Ok(Terminated(stopped)) => {
                ctx.log().debug(format!("Terminated {}", stopped.path()));
                if stopped == self.sys_guard {
                    self.sys_stopped = true;
                } else if stopped == self.tmp_guard {
                    self.tmp_stopped = true;
                } else if stopped == self.usr_guard {
                    self.usr_stopped = true;
                } else if stopped == self.rmt_guard {
                    self.rmt_stopped = true;
                }

                if self.sys_stopped && self.tmp_stopped {
                    ctx.system()
                        .send_system(ctx.myself(), SystemMsg::StopAfterChildren, ctx.myself());
                } else if self.usr_stopped && self.rmt_stopped {
                    if !self.sys_stopped {
                        ctx.system()
                            .send_system(&self.sys_guard, SystemMsg::Stop, ctx.myself());
                    }
                    if !self.tmp_stopped {
                        ctx.system()
                            .send_system(&self.tmp_guard, SystemMsg::Stop, ctx.myself());
                    }
                }
            }
            Err(_) => {
                ctx.log().error("Unknown root message!");
            }
        }
    }
}
