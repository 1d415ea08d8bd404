#![crate_name = "yato"]
#![deny(clippy::all)]
#![allow(clippy::new_ret_no_self)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::module_inception)]

mod error;
mod validate;

pub mod actor;
pub mod container;
pub mod kernel;
pub mod system;

use std::any::Any;
use std::env;
use std::fmt;

use config::{Config, File};

use crate::actor::ActorRef;

pub use crate::error::{Error, Result};

pub fn load_config() -> Config {
    // yato.toml contains settings for anything related to the actor runtime.
    // The file is optional; without it the defaults below apply.
    let path = env::var("YATO_CONF").unwrap_or_else(|_| "config/yato.toml".into());

    Config::builder()
        .set_default("log_level", "info")
        .unwrap()
        .set_default("enable_io", false)
        .unwrap()
        .set_default("default_executor", "default")
        .unwrap()
        .add_source(File::with_name(&path).required(false))
        .build()
        .unwrap()
}

/// Wraps a message payload and its sender
#[derive(Debug)]
pub struct Envelope {
    pub msg: AnyMessage,
    pub sender: ActorRef,
}

/// A type-erased message payload.
///
/// All user messages travel through mailboxes as `AnyMessage`. Receivers
/// recover the concrete type with `downcast`, which hands the message
/// back on mismatch so several candidate types can be tried in order.
///
/// The empty payload stands for "no value": `ask` resolves to it on
/// timeout and `Inbox::receive` returns it when the wait expires.
pub struct AnyMessage {
    msg: Option<Box<dyn Any + Send>>,
}

impl AnyMessage {
    pub fn new<T>(msg: T) -> Self
    where
        T: Any + Send,
    {
        Self {
            msg: Some(Box::new(msg)),
        }
    }

    pub fn empty() -> Self {
        Self { msg: None }
    }

    pub fn is_empty(&self) -> bool {
        self.msg.is_none()
    }

    pub fn is<T: Any>(&self) -> bool {
        match self.msg.as_ref() {
            Some(m) => m.is::<T>(),
            None => false,
        }
    }

    /// Take the payload out as `T`, or return the message unchanged.
    pub fn downcast<T: Any>(self) -> std::result::Result<T, AnyMessage> {
        match self.msg {
            Some(m) => match m.downcast::<T>() {
                Ok(v) => Ok(*v),
                Err(m) => Err(AnyMessage { msg: Some(m) }),
            },
            None => Err(self),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.msg.as_ref().and_then(|m| m.downcast_ref::<T>())
    }
}

impl fmt::Debug for AnyMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            f.write_str("AnyMessage(empty)")
        } else {
            f.write_str("AnyMessage")
        }
    }
}

pub mod actors {
    //! Convenience re-exports for building actor based applications.
    pub use crate::actor::{
        behavior, Actor, ActorPath, ActorRef, ActorScope, Ask, BoxActor, BoxBehavior, Find, Inbox,
        PathElements, Props, Receive, SelectionFailure, SelectionSuccess,
    };
    pub use crate::kernel::Context;
    pub use crate::system::{ActorSystem, LogLevel, Logger, PoisonPill, SystemConfig, Terminated};
    pub use crate::{load_config, AnyMessage, Envelope};
}
