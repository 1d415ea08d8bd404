use std::time::{Duration, Instant};

use yato::actors::*;
use yato::system::{ExecutorConfig, ExecutorKind, SystemConfig};

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

struct AddOne;

impl Actor for AddOne {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(n) = msg.downcast::<i32>() {
            ctx.sender().tell(n + 1, Some(ctx.myself().clone()));
        }
    }
}

#[test]
fn ask_returns_the_first_reply() {
    let system = test_system("ask1");
    let actor = system.actor_of(Props::new(|| AddOne), "adder").unwrap();

    let reply = system.ask(&actor, 41i32, RECV).wait();
    assert_eq!(reply.downcast::<i32>().unwrap(), 42);

    let reply = actor.ask(10i32, RECV).wait();
    assert_eq!(reply.downcast::<i32>().unwrap(), 11);

    system.shutdown();
}

struct Sleepy;

impl Actor for Sleepy {
    fn receive(&mut self, ctx: &mut Context, _msg: AnyMessage) {
        std::thread::sleep(Duration::from_millis(400));
        ctx.sender().tell("late".to_string(), Some(ctx.myself().clone()));
    }
}

#[test]
fn ask_timeout_resolves_empty_and_stops_the_asker() {
    let system = test_system("ask2");
    let slow = system.actor_of(Props::new(|| Sleepy), "slow").unwrap();

    let started = Instant::now();
    let reply = system.ask(&slow, "q".to_string(), Duration::from_millis(50)).wait();
    let elapsed = started.elapsed();

    assert!(reply.is_empty());
    assert!(
        elapsed < Duration::from_millis(300),
        "timeout took {:?}",
        elapsed
    );

    // The temp asker was the first one, so its name is deterministic
    let asker_path = ActorPath::from_string(format!("yato://{}/temp/ask0", system.name()));
    let mut gone = false;
    for _ in 0..100 {
        if system
            .find(asker_path.clone(), Duration::from_millis(500))
            .wait()
            .is_empty()
        {
            gone = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(gone, "the temp asker is still alive");

    system.shutdown();
}

struct Relay;

impl Actor for Relay {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(n) = msg.downcast::<u32>() {
            ctx.sender().tell(n, Some(ctx.myself().clone()));
        }
    }
}

#[test]
fn user_messages_keep_enqueue_order_per_sender() {
    let system = test_system("fifo");
    let relay = system.actor_of(Props::new(|| Relay), "relay").unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();

    for n in 0..200u32 {
        inbox.send(&relay, n);
    }
    for expected in 0..200u32 {
        let got = inbox.receive(RECV).downcast::<u32>().unwrap();
        assert_eq!(got, expected);
    }

    system.shutdown();
}

fn pinned_settings() -> SystemConfig {
    SystemConfig {
        log_level: LogLevel::Silent,
        execution_contexts: vec![ExecutorConfig {
            name: "pin".to_string(),
            kind: ExecutorKind::Pinned { threads_limit: 8 },
        }],
        ..SystemConfig::default()
    }
}

#[test]
fn pinned_actors_run_on_their_own_threads() {
    let system = ActorSystem::with_settings("pinned", pinned_settings()).unwrap();

    let actor = system
        .actor_of(Props::new(|| AddOne).with_executor("pin"), "pinned-adder")
        .unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();

    for n in 0..50i32 {
        inbox.send(&actor, n);
    }
    for expected in 1..51i32 {
        let got = inbox.receive(RECV).downcast::<i32>().unwrap();
        assert_eq!(got, expected);
    }

    // Pinned actors stop like any other
    inbox.watch(&actor);
    actor.stop();
    let terminated = inbox.receive(RECV).downcast::<Terminated>().unwrap();
    assert_eq!(terminated.0, actor);

    system.shutdown();
}

#[test]
fn unknown_execution_context_is_rejected() {
    let system = test_system("noctx");
    let result = system.actor_of(Props::new(|| AddOne).with_executor("nope"), "a");
    assert!(result.is_err());
    system.shutdown();
}

#[test]
fn ask_works_against_pinned_actors() {
    let system = ActorSystem::with_settings("pinned2", pinned_settings()).unwrap();
    let actor = system
        .actor_of(Props::new(|| AddOne).with_executor("pin"), "adder")
        .unwrap();

    let reply = system.ask(&actor, 1i32, RECV).wait();
    assert_eq!(reply.downcast::<i32>().unwrap(), 2);

    system.shutdown();
}
