//! Error types for cmdflag

use std::io;
use thiserror::Error;

/// Result type alias for cmdflag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cmdflag
#[derive(Error, Debug)]
pub enum Error {
    /// A command was registered with an empty name
    #[error("missing command name")]
    MissingCommandName,

    /// A command was registered without an initializer
    #[error("missing command initializer")]
    MissingInitializer,

    /// A sibling command with the same name already exists
    #[error("command {0} redeclared")]
    DuplicateCommand(String),

    /// The first positional argument does not name a top level command
    #[error("{0} is not a valid command")]
    NoCommand(String),

    /// The help command was asked about an unknown command
    #[error("command {0} not found")]
    CommandNotFound(String),

    /// Flag parsing errors, passed through from the flag set
    #[error(transparent)]
    Flag(#[from] FlagError),

    /// Whatever a command handler returned
    #[error(transparent)]
    Handler(anyhow::Error),

    /// I/O errors while writing usage or version output
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Flag parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// `-h` or `-help` was given without being declared
    #[error("flag: help requested")]
    Help,

    #[error("flag provided but not defined: -{0}")]
    Undefined(String),

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid value {value:?} for flag -{name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },
}

/// Specialized result type for flag parsing
pub type FlagResult<T> = std::result::Result<T, FlagError>;

impl Error {
    /// Whether this error is the help request signal of a flag set
    pub fn is_help(&self) -> bool {
        matches!(self, Error::Flag(FlagError::Help))
    }
}
