//! Error types for command construction and dispatch.
//!
//! Three families of failure exist:
//!
//! - [`DescriptorError`]: malformed metadata caught while building descriptors
//!   or a registry. Fatal; never recovered.
//! - [`DispatchError`]: a user error in the argument vector. Reported to the
//!   caller with a message naming the offending token or parameter.
//! - Application errors raised by a command body. These are carried through
//!   [`Error::Application`] untouched.

use crate::value::TypeTag;

/// Malformed parameter or command metadata.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    /// A parameter, command or registry was given an empty name.
    #[error("invalid descriptor: {kind} name must not be empty")]
    EmptyName { kind: &'static str },

    /// A name that cannot be spelled as a `--name` option.
    #[error("invalid descriptor: {kind} name '{name}' is not a valid option name")]
    MalformedName { kind: &'static str, name: String },

    /// Two parameters of one command share a name.
    #[error("invalid descriptor: command '{command}' declares parameter '{parameter}' twice")]
    DuplicateParameter { command: String, parameter: String },

    /// Two parameters of one command share a declaration index.
    #[error("invalid descriptor: command '{command}' has two parameters at index {index}")]
    DuplicateIndex { command: String, index: usize },

    /// Two commands of one registry share a name.
    #[error("invalid descriptor: command '{0}' is defined more than once")]
    DuplicateCommand(String),

    /// A command or parameter uses a name reserved for a built-in option.
    #[error("invalid descriptor: {kind} name '{name}' is reserved")]
    ReservedName { kind: &'static str, name: String },
}

/// A user error found while dispatching an argument vector.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// The first token does not name a registered command.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A required parameter was still unbound after all tokens were consumed.
    #[error("missing required argument '{parameter}' for command '{command}'")]
    MissingRequiredArgument { command: String, parameter: String },

    /// A literal could not be converted to the parameter's declared type.
    #[error("invalid value '{literal}' for '{parameter}': expected {expected}")]
    TypeCoercion {
        command: String,
        parameter: String,
        literal: String,
        expected: TypeTag,
    },

    /// `--name` does not match any parameter of the command.
    #[error("unknown option '--{option}' for command '{command}'")]
    UnknownOption { command: String, option: String },

    /// `--name=value` was given for a parameter with no default.
    #[error("argument '{parameter}' of command '{command}' must be given positionally")]
    PositionalOnly { command: String, parameter: String },

    /// `--name` was given without `=value` for a non-boolean parameter.
    #[error("option '--{option}' requires a value (--{option}=<value>)")]
    MissingOptionValue { command: String, option: String },

    /// A positional token arrived after every required parameter was bound.
    #[error("unexpected argument '{token}' for command '{command}'")]
    UnexpectedArgument { command: String, token: String },
}

impl DispatchError {
    /// The command this error was raised for, if dispatch got that far.
    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchError::UnknownCommand(_) => None,
            DispatchError::MissingRequiredArgument { command, .. }
            | DispatchError::TypeCoercion { command, .. }
            | DispatchError::UnknownOption { command, .. }
            | DispatchError::PositionalOnly { command, .. }
            | DispatchError::MissingOptionValue { command, .. }
            | DispatchError::UnexpectedArgument { command, .. } => Some(command),
        }
    }
}

/// Top-level error returned by the dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidDescriptor(#[from] DescriptorError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// An error raised by the command body, passed through verbatim.
    #[error(transparent)]
    Application(anyhow::Error),
}

impl Error {
    /// Returns true for errors caused by the argument vector rather than by
    /// the command itself.
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Dispatch(_))
    }

    /// Returns the dispatch error, if this is one.
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            Error::Dispatch(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for clipper operations.
pub type Result<T> = std::result::Result<T, Error>;
