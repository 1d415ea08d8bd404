use futures::channel::oneshot;

use crate::actor::Actor;
use crate::kernel::Context;
use crate::AnyMessage;

/// Temp actor backing `ask`: captures the first reply into a one shot
/// channel and stops itself. When it is stopped before any reply, the
/// channel is completed with an empty message.
pub(crate) struct AskingActor {
    reply: Option<oneshot::Sender<AnyMessage>>,
}

impl AskingActor {
    pub(crate) fn new(reply: oneshot::Sender<AnyMessage>) -> AskingActor {
        AskingActor { reply: Some(reply) }
    }
}

impl Actor for AskingActor {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(msg);
            ctx.myself().stop();
        }
    }

    fn post_stop(&mut self, _ctx: &mut Context) {
        if let Some(reply) = self.reply.take() {
            let _ = reply.send(AnyMessage::empty());
        }
    }
}
