use std::fmt;
use std::sync::Arc;

use crate::validate::{validate_actor_name, validate_system_name};
use crate::{Error, Result};

/// Top level partition of the actor namespace within a system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorScope {
    /// All user created actors
    User,
    /// All system created actors
    System,
    /// All short lived system created actors
    Temp,
    /// All actors representing remote entities
    Remote,
    /// Virtual dead letter actors
    Dead,
    /// Reserved for parse failures, never valid for construction
    Unknown,
}

impl ActorScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorScope::User => "user",
            ActorScope::System => "system",
            ActorScope::Temp => "temp",
            ActorScope::Remote => "remote",
            ActorScope::Dead => "dead",
            ActorScope::Unknown => "unknown",
        }
    }

    pub fn from_token(token: &str) -> ActorScope {
        match token {
            "user" => ActorScope::User,
            "system" => ActorScope::System,
            "temp" => ActorScope::Temp,
            "remote" => ActorScope::Remote,
            "dead" => ActorScope::Dead,
            _ => ActorScope::Unknown,
        }
    }
}

impl fmt::Display for ActorScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of parsing an [`ActorPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathElements {
    pub system_name: String,
    pub scope: ActorScope,
    pub names: Vec<String>,
}

/// Hierarchical string address of an actor.
///
/// The textual form is `yato://<system>/<scope>/<name>(/<name>)*` where
/// the scope is one of `user`, `system`, `temp`, `remote` or `dead`.
/// The root of a system is addressed as `yato://<system>`.
///
/// Paths are value types; cloning is cheap and equality is string
/// equality.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorPath {
    path: Arc<String>,
}

impl ActorPath {
    pub const PREFIX: &'static str = "yato://";

    /// Wrap an already formed path string. No validation is performed;
    /// malformed input surfaces later through `parse`.
    pub fn from_string(path: impl Into<String>) -> ActorPath {
        ActorPath {
            path: Arc::new(path.into()),
        }
    }

    /// Build a validated path of a single actor within a scope.
    pub fn new(system_name: &str, scope: ActorScope, name: &str) -> Result<ActorPath> {
        validate_system_name(system_name)?;
        validate_actor_name(name)?;
        if scope == ActorScope::Unknown {
            return Err(Error::Argument(
                "the unknown scope is not a valid address".into(),
            ));
        }
        Ok(ActorPath::from_string(format!(
            "{}{}/{}/{}",
            Self::PREFIX,
            system_name,
            scope.as_str(),
            name
        )))
    }

    /// The root path of a system, `yato://<system>`.
    pub fn root_of(system_name: &str) -> Result<ActorPath> {
        validate_system_name(system_name)?;
        Ok(ActorPath::from_string(format!(
            "{}{}",
            Self::PREFIX,
            system_name
        )))
    }

    pub fn join(&self, name: &str) -> ActorPath {
        ActorPath::from_string(format!("{}/{}", self.path, name))
    }

    pub fn as_str(&self) -> &str {
        self.path.as_str()
    }

    /// Last segment of the path, or the whole remainder for a root path.
    pub fn name(&self) -> &str {
        match self.path.rfind('/') {
            Some(pos) => &self.path[pos + 1..],
            None => self.path.as_str(),
        }
    }

    /// Split the path into system name, scope and name segments.
    pub fn parse(&self) -> Result<PathElements> {
        self.parse_impl(false)
    }

    /// Like `parse` but stops right after the scope token, ignoring
    /// whatever follows it.
    pub fn parse_header(&self) -> Result<PathElements> {
        self.parse_impl(true)
    }

    fn parse_impl(&self, header_only: bool) -> Result<PathElements> {
        let rest = self
            .path
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| Error::Argument(format!("\"{}\" is not an actor path", self.path)))?;

        let mut segments = rest.split('/');

        let system_name = segments
            .next()
            .filter(|s| validate_system_name(s).is_ok())
            .ok_or_else(|| Error::Argument(format!("\"{}\" has no valid system name", self.path)))?
            .to_string();

        let scope_token = segments
            .next()
            .ok_or_else(|| Error::Argument(format!("\"{}\" has no scope", self.path)))?;
        let scope = ActorScope::from_token(scope_token);
        if scope == ActorScope::Unknown {
            return Err(Error::Argument(format!(
                "\"{}\" has an unknown scope \"{}\"",
                self.path, scope_token
            )));
        }

        let mut names = Vec::new();
        if !header_only {
            for segment in segments {
                validate_actor_name(segment)?;
                names.push(segment.to_string());
            }
            if names.is_empty() {
                return Err(Error::Argument(format!(
                    "\"{}\" has no actor name",
                    self.path
                )));
            }
        }

        Ok(PathElements {
            system_name,
            scope,
            names,
        })
    }
}

impl fmt::Display for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl fmt::Debug for ActorPath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ActorPath[{}]", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_join() {
        let path = ActorPath::new("sys", ActorScope::User, "a").unwrap();
        assert_eq!(path.as_str(), "yato://sys/user/a");
        assert_eq!(path.name(), "a");

        let child = path.join("b");
        assert_eq!(child.as_str(), "yato://sys/user/a/b");
        assert_eq!(child.name(), "b");
    }

    #[test]
    fn rejects_invalid_construction() {
        assert!(ActorPath::new("bad name", ActorScope::User, "a").is_err());
        assert!(ActorPath::new("sys", ActorScope::User, "a/b").is_err());
        assert!(ActorPath::new("sys", ActorScope::Unknown, "a").is_err());
    }

    #[test]
    fn parse_full_path() {
        let path = ActorPath::from_string("yato://sys/user/a/b");
        let elems = path.parse().unwrap();
        assert_eq!(elems.system_name, "sys");
        assert_eq!(elems.scope, ActorScope::User);
        assert_eq!(elems.names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn parse_header_only() {
        let path = ActorPath::from_string("yato://sys/temp/ask0");
        let elems = path.parse_header().unwrap();
        assert_eq!(elems.scope, ActorScope::Temp);
        assert!(elems.names.is_empty());
    }

    #[test]
    fn parse_failures() {
        assert!(ActorPath::from_string("nope://sys/user/a").parse().is_err());
        assert!(ActorPath::from_string("yato://sys/elsewhere/a")
            .parse()
            .is_err());
        assert!(ActorPath::from_string("yato://sys/user").parse().is_err());
        assert!(ActorPath::from_string("yato://sys/user/a")
            .parse_header()
            .is_ok());
    }
}
