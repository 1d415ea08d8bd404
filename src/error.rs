use std::error::Error as StdError;
use std::fmt;

/// Error taxonomy shared by the actor runtime and the container core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid name, path, shape or iterator pair
    Argument(String),

    /// Indexed access past the valid extents
    OutOfRange(String),

    /// Operation attempted on an object in the wrong state
    BadState(String),

    /// Invalid or inconsistent configuration
    Config(String),

    /// Resource level failure
    Runtime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Argument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::OutOfRange(msg) => write!(f, "Out of range: {}", msg),
            Error::BadState(msg) => write!(f, "Bad state: {}", msg),
            Error::Config(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl StdError for Error {}

pub type Result<T> = std::result::Result<T, Error>;
