use std::time::Duration;

use config::{Config, File, FileFormat};
use yato::actors::*;
use yato::system::{ExecutorKind, SystemConfig};
use yato::Error;

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

struct Dumb;

impl Actor for Dumb {
    fn receive(&mut self, _ctx: &mut Context, _msg: AnyMessage) {}
}

#[test]
fn system_identity() {
    let system = test_system("ident");
    assert_eq!(system.name(), "ident");
    assert!(system.uptime() < 5);
    let other = test_system("other");
    assert_ne!(system.id(), other.id());
    system.shutdown();
    other.shutdown();
}

#[test]
fn invalid_system_names_are_rejected() {
    assert!(ActorSystem::with_settings("has space", SystemConfig::default()).is_err());
    assert!(ActorSystem::with_settings("", SystemConfig::default()).is_err());
}

#[test]
fn shutdown_is_idempotent() {
    let system = test_system("down");
    system.actor_of(Props::new(|| Dumb), "a").unwrap();
    system.shutdown();
    system.shutdown();
}

#[test]
fn graceful_shutdown_waits_for_user_stops() {
    let system = test_system("drain");
    let actor = system.actor_of(Props::new(|| Dumb), "worker").unwrap();

    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.watch(&actor);
    actor.stop();
    let terminated = inbox.receive(RECV).downcast::<Terminated>().unwrap();
    assert_eq!(terminated.0, actor);

    system.shutdown_graceful();
}

#[test]
fn messages_to_nowhere_count_as_dead_letters() {
    let system = test_system("dead");

    system.dead_letters().tell("lost".to_string(), None);
    assert!(system.dead_letter_count() >= 1);

    let actor = system.actor_of(Props::new(|| Dumb), "brief").unwrap();
    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.watch(&actor);
    actor.stop();
    inbox.receive(RECV).downcast::<Terminated>().unwrap();

    // The cell is destroyed asynchronously; poll until the reference
    // stops resolving and the send counts as a dead letter
    let before = system.dead_letter_count();
    let mut counted = false;
    for _ in 0..100 {
        actor.tell("too late".to_string(), None);
        if system.dead_letter_count() > before {
            counted = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(counted);

    system.shutdown();
}

#[test]
fn inbox_receive_times_out_empty() {
    let system = test_system("inbox");
    let inbox = Inbox::new(&system, "patient").unwrap();
    let msg = inbox.receive(Duration::from_millis(50));
    assert!(msg.is_empty());
    system.shutdown();
}

#[test]
fn inbox_names_are_validated() {
    let system = test_system("inbox2");
    assert!(Inbox::new(&system, "ok-name").is_ok());
    assert!(Inbox::new(&system, "bad name").is_err());
    system.shutdown();
}

#[test]
fn enable_io_is_refused() {
    let result = ActorSystem::with_settings(
        "io",
        SystemConfig {
            enable_io: true,
            ..SystemConfig::default()
        },
    );
    match result {
        Err(Error::Config(_)) => {}
        other => panic!("expected a config error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn settings_parse_from_a_config_file() {
    let cfg = Config::builder()
        .add_source(File::from_str(
            r#"
            log_level = "silent"
            default_executor = "workers"

            [[execution_contexts]]
            name = "workers"
            type = "thread_pool"
            threads_num = 2
            throughput = 3

            [[execution_contexts]]
            name = "pin"
            type = "pinned"
            threads_limit = 4
            "#,
            FileFormat::Toml,
        ))
        .build()
        .unwrap();

    let settings = SystemConfig::from_config(&cfg).unwrap();
    assert_eq!(settings.log_level, LogLevel::Silent);
    assert_eq!(settings.default_executor, "workers");
    assert_eq!(settings.execution_contexts.len(), 2);
    assert_eq!(
        settings.execution_contexts[0].kind,
        ExecutorKind::ThreadPool {
            threads_num: 2,
            throughput: 3
        }
    );
    assert_eq!(
        settings.execution_contexts[1].kind,
        ExecutorKind::Pinned { threads_limit: 4 }
    );

    // And the system actually runs on them
    let system = ActorSystem::with_config("fromfile", cfg).unwrap();
    let actor = system.actor_of(Props::new(|| Echo), "echo").unwrap();
    let reply = system.ask(&actor, 5i32, RECV).wait();
    assert_eq!(reply.downcast::<i32>().unwrap(), 6);
    system.shutdown();
}

#[test]
fn bad_settings_are_config_errors() {
    let bad_level = Config::builder()
        .add_source(File::from_str("log_level = \"noisy\"", FileFormat::Toml))
        .build()
        .unwrap();
    assert!(matches!(
        SystemConfig::from_config(&bad_level),
        Err(Error::Config(_))
    ));

    let bad_type = Config::builder()
        .add_source(File::from_str(
            r#"
            [[execution_contexts]]
            name = "x"
            type = "fibers"
            "#,
            FileFormat::Toml,
        ))
        .build()
        .unwrap();
    assert!(matches!(
        SystemConfig::from_config(&bad_type),
        Err(Error::Config(_))
    ));

    let missing_default = SystemConfig {
        default_executor: "absent".to_string(),
        ..SystemConfig::default()
    };
    assert!(matches!(
        ActorSystem::with_settings("cfg", missing_default),
        Err(Error::Config(_))
    ));
}

#[test]
fn actor_refs_compare_by_path() {
    let system = test_system("eq");
    let a = system.actor_of(Props::new(|| Dumb), "same").unwrap();
    let b = a.clone();
    assert_eq!(a, b);
    assert_eq!(a.name(), "same");
    assert_eq!(
        a.path().as_str(),
        format!("yato://{}/user/same", system.name())
    );
    assert!(ActorRef::empty().is_empty());
    assert!(!a.is_empty());
    system.shutdown();
}

struct Echo;

impl Actor for Echo {
    fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
        if let Ok(n) = msg.downcast::<i32>() {
            ctx.sender().tell(n + 1, Some(ctx.myself().clone()));
        }
    }
}
