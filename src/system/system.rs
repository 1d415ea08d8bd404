use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, RwLock, Weak};
use std::time::{Duration, Instant};

use chrono::prelude::*;
use config::{Config, Map, Value};
use dashmap::DashMap;
use futures::channel::oneshot;
use uuid::Uuid;

use crate::actor::asking::AskingActor;
use crate::actor::selection::SelectorActor;
use crate::actor::{ActorPath, ActorRef, ActorScope, Ask, Find, Props};
use crate::kernel::cell::ActorCell;
use crate::kernel::ExecutionContext;
use crate::system::root::{Root, RootAdd, RootTerminate};
use crate::system::timer::Scheduler;
use crate::system::{LogLevel, Logger, Selection, SystemEnvelope, SystemMsg, Terminated};
use crate::validate::{validate_actor_name, validate_system_name};
use crate::{AnyMessage, Envelope, Error, Result};

/// Weak back reference to a system, held by refs and cells.
#[derive(Clone)]
pub(crate) struct SystemHandle(Weak<SystemShared>);

impl SystemHandle {
    pub(crate) fn detached() -> SystemHandle {
        SystemHandle(Weak::new())
    }

    pub(crate) fn upgrade(&self) -> Option<ActorSystem> {
        self.0.upgrade().map(|shared| ActorSystem { shared })
    }
}

/// Executor selection of one execution context entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorKind {
    ThreadPool { threads_num: usize, throughput: u32 },
    Pinned { threads_limit: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    pub name: String,
    pub kind: ExecutorKind,
}

/// Recognized actor system options.
///
/// Parsed from a [`config::Config`] by [`SystemConfig::from_config`];
/// the defaults are one `thread_pool` executor named `default` with 4
/// threads and throughput 5, log level `info` and no IO.
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub log_level: LogLevel,
    pub enable_io: bool,
    pub default_executor: String,
    pub execution_contexts: Vec<ExecutorConfig>,
}

impl Default for SystemConfig {
    fn default() -> SystemConfig {
        SystemConfig {
            log_level: LogLevel::Info,
            enable_io: false,
            default_executor: "default".to_string(),
            execution_contexts: Vec::new(),
        }
    }
}

impl SystemConfig {
    pub fn from_config(cfg: &Config) -> Result<SystemConfig> {
        let log_level = match cfg.get_string("log_level") {
            Ok(value) => value.parse::<LogLevel>()?,
            Err(_) => LogLevel::Info,
        };
        let enable_io = cfg.get_bool("enable_io").unwrap_or(false);
        let default_executor = cfg
            .get_string("default_executor")
            .unwrap_or_else(|_| "default".to_string());

        let mut execution_contexts = Vec::new();
        if let Ok(entries) = cfg.get_array("execution_contexts") {
            for entry in entries {
                execution_contexts.push(parse_executor_entry(entry)?);
            }
        }

        Ok(SystemConfig {
            log_level,
            enable_io,
            default_executor,
            execution_contexts,
        })
    }
}

fn parse_executor_entry(value: Value) -> Result<ExecutorConfig> {
    let table = value
        .into_table()
        .map_err(|e| Error::Config(format!("execution_contexts: {}", e)))?;

    let name = table_string(&table, "name")?
        .ok_or_else(|| Error::Config("execution_contexts entry without a name".into()))?;
    let kind_token = table_string(&table, "type")?
        .ok_or_else(|| Error::Config(format!("execution context \"{}\" without a type", name)))?;

    let kind = match kind_token.as_str() {
        "thread_pool" => ExecutorKind::ThreadPool {
            threads_num: table_uint(&table, "threads_num")?.unwrap_or(4) as usize,
            throughput: table_uint(&table, "throughput")?.unwrap_or(5).max(1) as u32,
        },
        "pinned" => ExecutorKind::Pinned {
            threads_limit: table_uint(&table, "threads_limit")?.unwrap_or(16) as usize,
        },
        other => {
            return Err(Error::Config(format!(
                "Unknown executor type \"{}\"",
                other
            )))
        }
    };

    Ok(ExecutorConfig { name, kind })
}

fn table_string(table: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        Some(value) => value
            .clone()
            .into_string()
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

fn table_uint(table: &Map<String, Value>, key: &str) -> Result<Option<u64>> {
    match table.get(key) {
        Some(value) => {
            let raw = value
                .clone()
                .into_int()
                .map_err(|e| Error::Config(format!("{}: {}", key, e)))?;
            if raw < 0 {
                return Err(Error::Config(format!("{} must not be negative", key)));
            }
            Ok(Some(raw as u64))
        }
        None => Ok(None),
    }
}

pub(crate) struct SystemShared {
    name: String,
    id: Uuid,
    started_at: DateTime<Utc>,
    log: Logger,
    dead_letters: ActorRef,
    dead_letter_count: AtomicU64,
    names: DashMap<String, u64>,
    root_path: ActorPath,
    user_guardian_path: ActorPath,
    terminate_flag: Mutex<bool>,
    terminate_cv: Condvar,
    // Drop order matters below: the timer goes first so no task fires
    // into a dying tree, then the cells, then the executors which join
    // their threads.
    scheduler: Scheduler,
    root: RwLock<Option<Arc<ActorCell>>>,
    executions: Vec<Arc<ExecutionContext>>,
    default_execution: usize,
}

/// The actor runtime coordinator.
///
/// Owns the supervision tree, the execution contexts and the timer.
/// Handles are cheap clones sharing one runtime; create one system per
/// application.
///
/// ```no_run
/// use yato::actors::*;
///
/// struct Hello;
///
/// impl Actor for Hello {
///     fn receive(&mut self, ctx: &mut Context, msg: AnyMessage) {
///         if let Ok(name) = msg.downcast::<String>() {
///             ctx.log().info(format!("hello, {}", name));
///         }
///     }
/// }
///
/// let system = ActorSystem::new("app").unwrap();
/// let hello = system.actor_of(Props::new(|| Hello), "hello").unwrap();
/// hello.tell("world".to_string(), None);
/// system.shutdown();
/// ```
#[derive(Clone)]
pub struct ActorSystem {
    pub(crate) shared: Arc<SystemShared>,
}

impl ActorSystem {
    /// Create a new system configured by [`crate::load_config`].
    pub fn new(name: &str) -> Result<ActorSystem> {
        ActorSystem::with_config(name, crate::load_config())
    }

    /// Create a new system from an explicit `config::Config`.
    pub fn with_config(name: &str, cfg: Config) -> Result<ActorSystem> {
        ActorSystem::with_settings(name, SystemConfig::from_config(&cfg)?)
    }

    /// Create a new system from parsed settings.
    pub fn with_settings(name: &str, settings: SystemConfig) -> Result<ActorSystem> {
        validate_system_name(name)?;

        if settings.enable_io {
            return Err(Error::Config(
                "IO can't be enabled: the transport layer ships separately".into(),
            ));
        }

        let log = Logger::new(format!("ActorSystem[{}]", name), settings.log_level);

        let mut executions: Vec<Arc<ExecutionContext>> = Vec::new();
        for entry in &settings.execution_contexts {
            let execution = match entry.kind {
                ExecutorKind::ThreadPool {
                    threads_num,
                    throughput,
                } => ExecutionContext::thread_pool(&entry.name, threads_num, throughput, &log)?,
                ExecutorKind::Pinned { threads_limit } => {
                    ExecutionContext::pinned(&entry.name, threads_limit, &log)?
                }
            };
            executions.push(Arc::new(execution));
        }
        let default_execution = match executions
            .iter()
            .position(|e| e.name == settings.default_executor)
        {
            Some(pos) => pos,
            None if settings.default_executor == "default" => {
                executions.push(Arc::new(ExecutionContext::thread_pool("default", 4, 5, &log)?));
                executions.len() - 1
            }
            None => {
                return Err(Error::Config(format!(
                    "Default executor \"{}\" is not found!",
                    settings.default_executor
                )))
            }
        };

        let root_path = ActorPath::root_of(name)?;
        let user_guardian_path = root_path.join(ActorScope::User.as_str());
        let dead_path = ActorPath::new(name, ActorScope::Dead, "_dead_")?;
        let scheduler = Scheduler::new(log.scoped("scheduler"));

        let shared = Arc::new_cyclic(|weak: &Weak<SystemShared>| SystemShared {
            name: name.to_string(),
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            log: log.clone(),
            dead_letters: ActorRef::new(dead_path, SystemHandle(weak.clone()), Weak::new()),
            dead_letter_count: AtomicU64::new(0),
            names: DashMap::new(),
            root_path,
            user_guardian_path,
            terminate_flag: Mutex::new(false),
            terminate_cv: Condvar::new(),
            scheduler,
            root: RwLock::new(None),
            executions,
            default_execution,
        });
        let system = ActorSystem { shared };

        let root_cell = ActorCell::new(
            &system,
            system.shared.root_path.clone(),
            system.default_execution(),
            Box::new(Root::new()),
        );
        *system.shared.root.write().unwrap() = Some(root_cell.clone());
        system.send_system(root_cell.myself(), SystemMsg::Start, system.dead_letters());

        log.debug(format!("Actor system [{}] [{}] started", system.id(), name));

        Ok(system)
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// The UUID assigned to the system.
    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// The system start date.
    pub fn start_date(&self) -> DateTime<Utc> {
        self.shared.started_at
    }

    /// Seconds since the system started.
    pub fn uptime(&self) -> u64 {
        Utc::now()
            .signed_duration_since(self.shared.started_at)
            .num_seconds()
            .max(0) as u64
    }

    pub fn logger(&self) -> &Logger {
        &self.shared.log
    }

    /// The sink of undeliverable messages.
    pub fn dead_letters(&self) -> &ActorRef {
        &self.shared.dead_letters
    }

    /// Number of messages that ended up in dead letters.
    pub fn dead_letter_count(&self) -> u64 {
        self.shared.dead_letter_count.load(Ordering::Relaxed)
    }

    pub(crate) fn handle(&self) -> SystemHandle {
        SystemHandle(Arc::downgrade(&self.shared))
    }

    pub(crate) fn default_execution(&self) -> Arc<ExecutionContext> {
        self.shared.executions[self.shared.default_execution].clone()
    }

    fn resolve_execution(&self, name: Option<&str>) -> Result<Arc<ExecutionContext>> {
        match name {
            None => Ok(self.default_execution()),
            Some(name) => self
                .shared
                .executions
                .iter()
                .find(|e| e.name == name)
                .cloned()
                .ok_or_else(|| {
                    Error::Argument(format!("Execution context \"{}\" is not found!", name))
                }),
        }
    }

    fn root_ref(&self) -> Option<ActorRef> {
        self.shared
            .root
            .read()
            .unwrap()
            .as_ref()
            .map(|cell| cell.myself().clone())
    }

    /// Create a user actor.
    pub fn actor_of(&self, props: Props, name: &str) -> Result<ActorRef> {
        validate_actor_name(name)?;
        let path = ActorPath::new(&self.shared.name, ActorScope::User, name)?;
        self.create_actor_impl(props, path)
    }

    /// Create a short lived actor under the temp guardian with a
    /// generated name.
    pub fn tmp_actor_of(&self, props: Props) -> Result<ActorRef> {
        let name = self.next_name("tmp");
        let path = ActorPath::new(&self.shared.name, ActorScope::Temp, &name)?;
        self.create_actor_impl(props, path)
    }

    pub(crate) fn create_child(
        &self,
        parent: &ActorRef,
        name: &str,
        props: Props,
    ) -> Result<ActorRef> {
        validate_actor_name(name)?;
        let path = parent.path().join(name);
        self.create_child_impl(props, path, parent)
    }

    fn build_cell(&self, props: Props, path: ActorPath) -> Result<Arc<ActorCell>> {
        let elems = path.parse()?;
        if elems.scope == ActorScope::Dead {
            return Err(Error::Argument(
                "actors can't be created in the dead scope".into(),
            ));
        }
        let execution = self.resolve_execution(props.executor())?;
        let actor = props.produce();
        Ok(ActorCell::new(self, path, execution, actor))
    }

    fn create_actor_impl(&self, props: Props, path: ActorPath) -> Result<ActorRef> {
        let cell = self.build_cell(props, path)?;
        let created = cell.myself().clone();
        let root = self
            .root_ref()
            .ok_or_else(|| Error::BadState("the actor system is not running".into()))?;
        self.send_user(&root, self.dead_letters().clone(), AnyMessage::new(RootAdd(cell)));
        Ok(created)
    }

    fn create_child_impl(
        &self,
        props: Props,
        path: ActorPath,
        parent: &ActorRef,
    ) -> Result<ActorRef> {
        let cell = self.build_cell(props, path)?;
        let created = cell.myself().clone();
        self.send_system(parent, SystemMsg::AttachChild(cell), self.dead_letters());
        Ok(created)
    }

    pub(crate) fn send_user(&self, to: &ActorRef, from: ActorRef, msg: AnyMessage) {
        if to.is_empty() || to == self.dead_letters() {
            self.shared.dead_letter_count.fetch_add(1, Ordering::Relaxed);
            self.shared
                .log
                .verbose("A message was delivered to DeadLetters.");
            return;
        }
        let mbox = match to.mailbox() {
            Some(mbox) => mbox,
            None => {
                self.shared.dead_letter_count.fetch_add(1, Ordering::Relaxed);
                self.shared.log.verbose(format!(
                    "Failed to send a message. Actor {} is not found!",
                    to.path()
                ));
                return;
            }
        };
        if mbox.enqueue_user(Envelope { msg, sender: from }) {
            mbox.schedule_for_execution();
        }
    }

    pub(crate) fn send_system(&self, to: &ActorRef, msg: SystemMsg, from: &ActorRef) {
        if to.is_empty() || to == self.dead_letters() {
            self.shared
                .log
                .verbose("A system message was delivered to DeadLetters.");
            return;
        }
        let mbox = match to.mailbox() {
            Some(mbox) => mbox,
            None => {
                self.shared.log.verbose(format!(
                    "Failed to send a message. Actor {} is not found!",
                    to.path()
                ));
                return;
            }
        };
        if mbox.enqueue_system(SystemEnvelope {
            msg,
            sender: from.clone(),
        }) {
            mbox.schedule_for_execution();
        }
    }

    /// Send a stop signal; the actor terminates right after its current
    /// message.
    pub fn stop(&self, actor: &ActorRef) {
        let mbox = match actor.mailbox() {
            Some(mbox) => mbox,
            None => {
                self.shared.log.verbose(format!(
                    "Failed to stop actor. Actor {} is not found!",
                    actor.path()
                ));
                return;
            }
        };
        if mbox.enqueue_system(SystemEnvelope {
            msg: SystemMsg::Stop,
            sender: self.dead_letters().clone(),
        }) {
            mbox.schedule_for_execution();
        }
    }

    /// Register `watcher` to be told once when `watchee` stops. A
    /// missing watchee produces the notification immediately.
    pub fn watch(&self, watchee: &ActorRef, watcher: &ActorRef) {
        if watchee == self.dead_letters() || watcher == self.dead_letters() {
            self.shared.log.error("DeadLetters can't be used in watching");
            return;
        }
        let mbox = match watchee.mailbox() {
            Some(mbox) => mbox,
            None => {
                self.shared.log.warning(format!(
                    "Failed to find watchee. Actor {} is not found!",
                    watchee.path()
                ));
                watcher.tell(Terminated(watchee.clone()), None);
                return;
            }
        };
        if mbox.is_manual() {
            self.shared.log.warning("An inbox can't be watched");
            return;
        }
        if mbox.enqueue_system(SystemEnvelope {
            msg: SystemMsg::Watch(watcher.clone()),
            sender: watcher.clone(),
        }) {
            mbox.schedule_for_execution();
        }
    }

    pub fn unwatch(&self, watchee: &ActorRef, watcher: &ActorRef) {
        if watchee == self.dead_letters() || watcher == self.dead_letters() {
            self.shared.log.error("DeadLetters can't be used in watching");
            return;
        }
        let mbox = match watchee.mailbox() {
            Some(mbox) => mbox,
            None => {
                self.shared.log.warning(format!(
                    "Failed to find watchee. Actor {} is not found!",
                    watchee.path()
                ));
                return;
            }
        };
        if mbox.enqueue_system(SystemEnvelope {
            msg: SystemMsg::Unwatch(watcher.clone()),
            sender: watcher.clone(),
        }) {
            mbox.schedule_for_execution();
        }
    }

    /// Send `msg` to `addressee` and capture the first reply.
    pub fn ask<T>(&self, addressee: &ActorRef, msg: T, timeout: Duration) -> Ask
    where
        T: Any + Send,
    {
        self.ask_any(addressee, AnyMessage::new(msg), timeout)
    }

    pub(crate) fn ask_any(&self, addressee: &ActorRef, msg: AnyMessage, timeout: Duration) -> Ask {
        let (tx, rx) = oneshot::channel::<AnyMessage>();

        let name = self.next_name("ask");
        let path = match ActorPath::new(&self.shared.name, ActorScope::Temp, &name) {
            Ok(path) => path,
            Err(_) => return Ask::ready_empty(),
        };
        let asker =
            match self.create_actor_impl(Props::new(move || AskingActor::new(tx)), path) {
                Ok(asker) => asker,
                Err(_) => return Ask::ready_empty(),
            };

        self.send_user(addressee, asker.clone(), msg);

        self.shared
            .scheduler
            .enqueue_at(Instant::now() + timeout, move || asker.stop());

        Ask::new(rx)
    }

    /// Find an actor by path.
    pub fn find(&self, path: ActorPath, timeout: Duration) -> Find {
        let (tx, rx) = oneshot::channel::<ActorRef>();

        let name = self.next_name("find");
        let selector_path = match ActorPath::new(&self.shared.name, ActorScope::Temp, &name) {
            Ok(path) => path,
            Err(_) => return Find::ready_empty(),
        };
        let selector = match self
            .create_actor_impl(Props::new(move || SelectorActor::new(path, tx)), selector_path)
        {
            Ok(selector) => selector,
            Err(_) => return Find::ready_empty(),
        };

        self.shared
            .scheduler
            .enqueue_at(Instant::now() + timeout, move || selector.stop());

        Find::new(rx)
    }

    /// Find an actor by name in the user scope.
    pub fn find_by_name(&self, name: &str, timeout: Duration) -> Find {
        match ActorPath::new(&self.shared.name, ActorScope::User, name) {
            Ok(path) => self.find(path, timeout),
            Err(_) => Find::ready_empty(),
        }
    }

    pub(crate) fn select_from_root(&self, selection: Selection) {
        let sender = selection.sender.clone();
        if let Some(root) = self.root_ref() {
            self.send_system(&root, SystemMsg::Selection(selection), &sender);
        }
    }

    /// Terminate the system, stopping all actors outright. Blocks until
    /// the root actor reports stopped.
    pub fn shutdown(&self) {
        self.shutdown_impl(true);
    }

    /// Terminate the system once the user initiated stops have drained:
    /// the user and remote guardians stop after their children are
    /// gone. Blocks until the root actor reports stopped.
    pub fn shutdown_graceful(&self) {
        self.shutdown_impl(false);
    }

    fn shutdown_impl(&self, force: bool) {
        {
            let stopped = self.shared.terminate_flag.lock().unwrap();
            if *stopped {
                return;
            }
        }
        let root = match self.root_ref() {
            Some(root) => root,
            None => return,
        };
        self.send_user(
            &root,
            self.dead_letters().clone(),
            AnyMessage::new(RootTerminate { force }),
        );

        let mut stopped = self.shared.terminate_flag.lock().unwrap();
        while !*stopped {
            stopped = self.shared.terminate_cv.wait(stopped).unwrap();
        }
    }

    /// Called by executors when an actor has completed its stop.
    pub(crate) fn notify_on_stop(&self, stopped: &ActorRef) {
        if stopped.path() == &self.shared.root_path {
            {
                let mut flag = self.shared.terminate_flag.lock().unwrap();
                *flag = true;
            }
            self.shared.terminate_cv.notify_all();
            self.shared.log.verbose("The root is stopped.");
        } else if stopped.path() == &self.shared.user_guardian_path {
            // No user actors remain; pending ask and find deadlines are
            // pointless from here on
            self.shared.scheduler.stop();
            self.shared
                .log
                .verbose(format!("Actor {} is stopped.", stopped.path()));
        } else {
            self.shared
                .log
                .verbose(format!("Actor {} is stopped.", stopped.path()));
        }
    }

    fn next_name(&self, prefix: &str) -> String {
        let mut entry = self.shared.names.entry(prefix.to_string()).or_insert(0);
        let index = *entry;
        *entry += 1;
        format!("{}{}", prefix, index)
    }
}

impl std::fmt::Debug for ActorSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ActorSystem[{}]", self.shared.name)
    }
}
