use std::time::Duration;

use yato::actors::*;
use yato::system::SystemConfig;

const RECV: Duration = Duration::from_secs(5);

fn test_system(name: &str) -> ActorSystem {
    ActorSystem::with_settings(
        name,
        SystemConfig {
            log_level: LogLevel::Silent,
            ..SystemConfig::default()
        },
    )
    .unwrap()
}

struct Counter {
    probe: Option<ActorRef>,
    count: u32,
    target: u32,
}

impl Counter {
    fn new(target: u32) -> Counter {
        Counter {
            probe: None,
            count: 0,
            target,
        }
    }
}

impl Actor for Counter {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        let msg = match msg.downcast::<ActorRef>() {
            Ok(probe) => {
                self.probe = Some(probe);
                return;
            }
            Err(msg) => msg,
        };
        if msg.is::<u32>() {
            self.count += 1;
            if self.count == self.target {
                if let Some(probe) = &self.probe {
                    probe.tell(self.count, Some(ctx.myself().clone()));
                }
            }
        }
    }
}

#[test]
fn actor_create() {
    let system = test_system("create");

    assert!(system
        .actor_of(Props::new(|| Counter::new(1)), "valid-name")
        .is_ok());

    assert!(system.actor_of(Props::new(|| Counter::new(1)), "").is_err());
    assert!(system
        .actor_of(Props::new(|| Counter::new(1)), "with space")
        .is_err());
    assert!(system
        .actor_of(Props::new(|| Counter::new(1)), "a/b/c")
        .is_err());

    system.shutdown();
}

#[test]
fn actor_tell_counts_across_batches() {
    let system = test_system("tell");
    let actor = system
        .actor_of(Props::new(|| Counter::new(1000)), "counter")
        .unwrap();

    let inbox = Inbox::new(&system, "probe").unwrap();
    actor.tell(inbox.actor_ref().clone(), None);
    for _ in 0..1000 {
        actor.tell(1u32, None);
    }

    let done = inbox.receive(RECV);
    assert_eq!(done.downcast::<u32>().unwrap(), 1000);

    system.shutdown();
}

struct Ping;

impl Actor for Ping {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(n) = msg.downcast::<i32>() {
            if n == 0 {
                ctx.myself().stop();
            } else {
                ctx.sender().tell(n - 1, Some(ctx.myself().clone()));
            }
        }
    }
}

#[test]
fn ping_pong_counts_down_and_terminates() {
    let system = test_system("s");
    let ping = system.actor_of(Props::new(|| Ping), "ping").unwrap();

    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.watch(&ping);

    inbox.send(&ping, 10i32);
    for expected in (0..=9).rev() {
        let got = inbox.receive(RECV).downcast::<i32>().unwrap();
        assert_eq!(got, expected);
        inbox.send(&ping, got);
    }

    // Sending 0 stopped the actor
    let terminated = inbox.receive(RECV).downcast::<Terminated>().unwrap();
    assert_eq!(terminated.0, ping);

    system.shutdown();
}

struct Switcher;

impl Actor for Switcher {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(cmd) = msg.downcast::<String>() {
            match cmd.as_str() {
                "get" => ctx
                    .sender()
                    .tell("A".to_string(), Some(ctx.myself().clone())),
                "swap" => ctx.become_behavior(
                    behavior(|ctx, msg| {
                        if let Ok(cmd) = msg.downcast::<String>() {
                            match cmd.as_str() {
                                "get" => ctx
                                    .sender()
                                    .tell("B".to_string(), Some(ctx.myself().clone())),
                                "pop" => ctx.unbecome(),
                                _ => {}
                            }
                        }
                    }),
                    false,
                ),
                _ => {}
            }
        }
    }
}

#[test]
fn become_and_unbecome_switch_replies() {
    let system = test_system("behaviors");
    let actor = system.actor_of(Props::new(|| Switcher), "switcher").unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();

    inbox.send(&actor, "get".to_string());
    inbox.send(&actor, "swap".to_string());
    inbox.send(&actor, "get".to_string());
    inbox.send(&actor, "pop".to_string());
    inbox.send(&actor, "get".to_string());

    let mut replies = Vec::new();
    for _ in 0..3 {
        replies.push(inbox.receive(RECV).downcast::<String>().unwrap());
    }
    assert_eq!(replies, vec!["A", "B", "A"]);

    system.shutdown();
}

#[test]
fn poison_pill_stops_without_dispatching() {
    let system = test_system("pill");
    let actor = system.actor_of(Props::new(|| Switcher), "victim").unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.watch(&actor);

    actor.tell(PoisonPill, None);
    // Queued after the pill: must never produce a reply
    inbox.send(&actor, "get".to_string());

    let terminated = inbox.receive(RECV).downcast::<Terminated>().unwrap();
    assert_eq!(terminated.0, actor);
    assert!(inbox.receive(Duration::from_millis(200)).is_empty());

    system.shutdown();
}

struct Echo;

impl Actor for Echo {
    fn receive(&mut self, ctx: &mut Context, _msg: AnyMessage) {
        ctx.sender().tell("ok".to_string(), Some(ctx.myself().clone()));
    }
}

struct Relay {
    target: ActorRef,
}

impl Actor for Relay {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        ctx.forward(msg, &self.target);
    }
}

#[test]
fn forward_preserves_the_original_sender() {
    let system = test_system("fwd");
    let echo = system.actor_of(Props::new(|| Echo), "echo").unwrap();
    let target = echo.clone();
    let relay = system
        .actor_of(Props::new(move || Relay { target }), "relay")
        .unwrap();

    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.send(&relay, "hi".to_string());

    // The echo reply goes straight back to the inbox, not to the relay
    let reply = inbox.receive(RECV).downcast::<String>().unwrap();
    assert_eq!(reply, "ok");

    system.shutdown();
}

struct FailsToStart;

impl Actor for FailsToStart {
    fn pre_start(&mut self, _ctx: &mut Context) {
        panic!("no way");
    }

    fn receive(&mut self, _ctx: &mut Context, _msg: AnyMessage) {}
}

#[test]
fn pre_start_panic_stops_the_actor() {
    let system = test_system("prestart");
    let actor = system
        .actor_of(Props::new(|| FailsToStart), "broken")
        .unwrap();

    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.watch(&actor);

    let terminated = inbox.receive(RECV).downcast::<Terminated>().unwrap();
    assert_eq!(terminated.0, actor);

    system.shutdown();
}

struct Grumpy;

impl Actor for Grumpy {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(cmd) = msg.downcast::<String>() {
            match cmd.as_str() {
                "boom" => panic!("dropped on the floor"),
                _ => ctx
                    .sender()
                    .tell("still here".to_string(), Some(ctx.myself().clone())),
            }
        }
    }
}

#[test]
fn receive_panic_keeps_the_actor_running() {
    let system = test_system("grumpy");
    let actor = system.actor_of(Props::new(|| Grumpy), "grumpy").unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();

    inbox.send(&actor, "boom".to_string());
    inbox.send(&actor, "ping".to_string());

    let reply = inbox.receive(RECV).downcast::<String>().unwrap();
    assert_eq!(reply, "still here");

    system.shutdown();
}
