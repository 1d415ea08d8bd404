use futures::channel::oneshot;

use crate::actor::{Actor, ActorPath, ActorRef};
use crate::kernel::Context;
use crate::system::Selection;
use crate::AnyMessage;

/// Reply of a successful path selection.
#[derive(Debug, Clone)]
pub struct SelectionSuccess(pub ActorRef);

/// Reply of a failed path selection.
#[derive(Debug, Clone)]
pub struct SelectionFailure(pub String);

/// Temp actor backing `find`: walks the actors tree with a selection
/// system message and resolves the lookup future with the result.
pub(crate) struct SelectorActor {
    target: ActorPath,
    reply: Option<oneshot::Sender<ActorRef>>,
}

impl SelectorActor {
    pub(crate) fn new(target: ActorPath, reply: oneshot::Sender<ActorRef>) -> SelectorActor {
        SelectorActor {
            target,
            reply: Some(reply),
        }
    }
}

impl Actor for SelectorActor {
    fn pre_start(&mut self, ctx: &mut Context) {
        match self.target.parse() {
            Ok(elems) => {
                // The next segment to match is popped off the back, so
                // the walk starts with the scope guardian's name.
                let mut path: Vec<String> = elems.names;
                path.reverse();
                path.push(elems.scope.as_str().to_string());

                ctx.system().select_from_root(Selection {
                    sender: ctx.myself().clone(),
                    path,
                });
            }
            Err(_) => {
                ctx.myself().tell(
                    SelectionFailure("Invalid target actor path.".to_string()),
                    Some(ctx.myself().clone()),
                );
            }
        }
    }

    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        match msg.downcast::<SelectionSuccess>() {
            Ok(SelectionSuccess(found)) => {
                if let Some(reply) = self.reply.take() {
                    let _ = reply.send(found);
                }
                ctx.myself().stop();
            }
            Err(msg) => match msg.downcast::<SelectionFailure>() {
                Ok(SelectionFailure(reason)) => {
                    ctx.log()
                        .verbose(format!("Selection failed. Reason: {}", reason));
                    if let Some(reply) = self.reply.take() {
                        let _ = reply.send(ActorRef::empty());
                    }
                    ctx.myself().stop();
                }
                Err(_) => {
                    ctx.log().error("Unexpected message!");
                }
            },
        }
    }

    fn post_stop(&mut self, ctx: &mut Context) {
        if let Some(reply) = self.reply.take() {
            ctx.log().warning("Search was interrupted by timeout.");
            let _ = reply.send(ActorRef::empty());
        }
    }
}
