use std::time::Duration;

use yato::actors::*;
use yato::system::SystemConfig;

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

struct WithChild;

impl Actor for WithChild {
    fn pre_start(&mut self, ctx: &mut Context) {
        ctx.actor_of(Props::new(|| Dumb), "inner").unwrap();
    }

    fn receive(&mut self, _ctx: &mut Context, _msg: AnyMessage) {}
}

/// Creation is asynchronous, so lookups poll until the tree settles.
fn find_until_present(system: &ActorSystem, path: &ActorPath) -> ActorRef {
    for _ in 0..100 {
        let found = system
            .find(path.clone(), Duration::from_secs(1))
            .wait();
        if !found.is_empty() {
            return found;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("actor at {} never became visible", path);
}

#[test]
fn find_resolves_a_top_level_actor() {
    let system = test_system("sel1");
    let actor = system.actor_of(Props::new(|| Dumb), "target").unwrap();

    let found = find_until_present(&system, actor.path());
    assert_eq!(found, actor);
    assert_eq!(found.path(), actor.path());

    system.shutdown();
}

#[test]
fn find_resolves_a_nested_child() {
    let system = test_system("sel2");
    let parent = system.actor_of(Props::new(|| WithChild), "outer").unwrap();

    let child_path = parent.path().join("inner");
    let found = find_until_present(&system, &child_path);
    assert_eq!(found.path(), &child_path);
    assert_eq!(found.name(), "inner");

    system.shutdown();
}

#[test]
fn find_by_name_searches_the_user_scope() {
    let system = test_system("sel3");
    let actor = system.actor_of(Props::new(|| Dumb), "named").unwrap();

    let mut found = ActorRef::empty();
    for _ in 0..100 {
        found = system.find_by_name("named", Duration::from_secs(1)).wait();
        if !found.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    assert_eq!(found, actor);

    system.shutdown();
}

#[test]
fn find_missing_path_resolves_empty() {
    let system = test_system("sel4");
    system.actor_of(Props::new(|| Dumb), "present").unwrap();

    let path = ActorPath::from_string(format!("yato://{}/user/absent", system.name()));
    let found = system.find(path, Duration::from_secs(2)).wait();
    assert!(found.is_empty());

    system.shutdown();
}

#[test]
fn find_malformed_path_resolves_empty() {
    let system = test_system("sel5");

    let path = ActorPath::from_string("yato://sel5/elsewhere/x");
    let found = system.find(path, Duration::from_secs(2)).wait();
    assert!(found.is_empty());

    system.shutdown();
}

#[test]
fn found_refs_are_usable_for_messaging() {
    let system = test_system("sel6");
    let actor = system.actor_of(Props::new(|| Echo), "echo").unwrap();

    let found = find_until_present(&system, actor.path());
    let inbox = Inbox::new(&system, "probe").unwrap();
    inbox.send(&found, 7i32);

    let reply = inbox.receive(Duration::from_secs(5)).downcast::<i32>().unwrap();
    assert_eq!(reply, 8);

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
