//! Argument-vector dispatch.
//!
//! The [`Dispatcher`] walks an argument vector through three states:
//!
//! 1. **Module action**: an empty vector or a leading `--help` renders the
//!    module help; a leading `--version` reports the version when the module
//!    has one.
//! 2. **Command selection**: the first token must name a registered command.
//! 3. **Binding**: the remaining tokens are bound to the command's parameters,
//!    then the command is invoked with them.
//!
//! Printing is left to the caller: the dispatcher returns an [`Outcome`].
//!
//! ```rust
//! use clipper::{Arguments, CommandDescriptor, CommandRegistry, Outcome, ParameterDescriptor, Value};
//!
//! let echo = CommandDescriptor::builder("echo")
//!     .parameter(ParameterDescriptor::new("text", 0)?)
//!     .callable(|args: &Arguments| args.take::<String>("text"))
//!     .build()?;
//! let registry = CommandRegistry::builder("tool").command(echo).build()?;
//!
//! let outcome = registry.dispatch(["echo", "hi"])?;
//! assert_eq!(outcome, Outcome::Returned(Value::Str("hi".into())));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use tracing::{debug, trace};

use crate::command::CommandDescriptor;
use crate::error::{DispatchError, Error, Result};
use crate::param::ParameterDescriptor;
use crate::registry::{CommandRegistry, HELP, VERSION};
use crate::value::{Arguments, TypeTag, Value};

/// Ends option parsing: every later token is positional.
const END_OF_OPTIONS: &str = "--";

/// What a successful dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Module or command help was requested.
    Help(String),
    /// `--version` was requested.
    Version(String),
    /// A command ran and returned this value.
    Returned(Value),
}

/// Result of binding a command's tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Every parameter is bound, defaults included.
    Bound(Arguments),
    /// `--help` appeared among the command's options.
    Help,
}

enum State<'r, 't> {
    SelectModuleAction(&'t [String]),
    SelectCommand(&'t [String]),
    BindArguments(&'r CommandDescriptor, &'t [String]),
    Invoke(&'r CommandDescriptor, Arguments),
}

/// Resolves argument vectors against a registry and invokes commands.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'r> {
    registry: &'r CommandRegistry,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r CommandRegistry) -> Self {
        Self { registry }
    }

    /// Dispatches `argv` (the tokens after the program name).
    ///
    /// Errors from the command body come back as [`Error::Application`],
    /// unchanged. Argument errors come back as [`Error::Dispatch`] and the
    /// command is not invoked.
    pub fn dispatch<I, S>(&self, argv: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
        let mut state = State::SelectModuleAction(&argv);

        loop {
            state = match state {
                State::SelectModuleAction(tokens) => match tokens.first().map(String::as_str) {
                    None => {
                        trace!("empty argument vector, showing module help");
                        return Ok(Outcome::Help(self.registry.help()));
                    }
                    Some(token) if is_option(token, HELP) => {
                        return Ok(Outcome::Help(self.registry.help()));
                    }
                    Some(token) if is_option(token, VERSION) => match self.registry.version() {
                        Some(version) => return Ok(Outcome::Version(version.to_string())),
                        None => State::SelectCommand(tokens),
                    },
                    Some(_) => State::SelectCommand(tokens),
                },

                State::SelectCommand(tokens) => {
                    let (name, rest) = match tokens.split_first() {
                        Some(split) => split,
                        None => return Ok(Outcome::Help(self.registry.help())),
                    };
                    let command = self.registry.lookup(name)?;
                    debug!(command = command.name(), "selected command");
                    State::BindArguments(command, rest)
                }

                State::BindArguments(command, tokens) => match bind(command, tokens)? {
                    Binding::Help => {
                        let help = command.help(self.registry.container(), self.registry.config());
                        return Ok(Outcome::Help(help));
                    }
                    Binding::Bound(arguments) => State::Invoke(command, arguments),
                },

                State::Invoke(command, arguments) => {
                    debug!(command = command.name(), arguments = arguments.len(), "invoking command");
                    return command
                        .invoke(&arguments)
                        .map(Outcome::Returned)
                        .map_err(|err| attribute(err, command.name()));
                }
            };
        }
    }
}

impl CommandRegistry {
    /// Shorthand for `Dispatcher::new(self).dispatch(argv)`.
    pub fn dispatch<I, S>(&self, argv: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Dispatcher::new(self).dispatch(argv)
    }
}

fn is_option(token: &str, name: &str) -> bool {
    token.strip_prefix("--") == Some(name)
}

/// Binds the tokens following a command name to its parameters.
///
/// Tokens are read left to right. `--name` binds `true` to a boolean
/// parameter, `--name=value` binds `value` coerced to the declared type, and
/// a bare token fills the next unbound required parameter. Required
/// parameters are positional only. Unbound optional
/// parameters take their defaults. The returned arguments are in declaration
/// order.
pub fn bind(command: &CommandDescriptor, tokens: &[String]) -> std::result::Result<Binding, DispatchError> {
    let required = command.required_parameters();
    let mut bound = Arguments::new();
    let mut next_required = 0;
    let mut options_ended = false;

    for token in tokens {
        if !options_ended {
            if token == END_OF_OPTIONS {
                options_ended = true;
                continue;
            }
            if is_option(token, HELP) {
                trace!(command = command.name(), "command help requested");
                return Ok(Binding::Help);
            }
            if let Some(option) = token.strip_prefix("--") {
                let (name, value) = bind_option(command, option)?;
                trace!(command = command.name(), parameter = name, "bound option");
                bound.insert(name, value);
                continue;
            }
        }

        let param = required
            .get(next_required)
            .ok_or_else(|| DispatchError::UnexpectedArgument {
                command: command.name().to_string(),
                token: token.clone(),
            })?;
        let value = coerce(command, param, token)?;
        trace!(command = command.name(), parameter = param.name(), "bound positional");
        bound.insert(param.name(), value);
        next_required += 1;
    }

    if let Some(missing) = required.iter().find(|p| !bound.contains(p.name())) {
        return Err(DispatchError::MissingRequiredArgument {
            command: command.name().to_string(),
            parameter: missing.name().to_string(),
        });
    }

    let arguments = command
        .parameters()
        .iter()
        .map(|param| {
            let value = bound
                .get(param.name())
                .or(param.default())
                .cloned()
                .unwrap_or_default();
            (param.name(), value)
        })
        .collect();

    Ok(Binding::Bound(arguments))
}

fn bind_option<'c>(
    command: &'c CommandDescriptor,
    option: &str,
) -> std::result::Result<(&'c str, Value), DispatchError> {
    let (name, literal) = match option.split_once('=') {
        Some((name, literal)) => (name, Some(literal)),
        None => (option, None),
    };

    let param = command
        .parameter(name)
        .ok_or_else(|| DispatchError::UnknownOption {
            command: command.name().to_string(),
            option: name.to_string(),
        })?;
    if !param.has_default() {
        return Err(DispatchError::PositionalOnly {
            command: command.name().to_string(),
            parameter: param.name().to_string(),
        });
    }

    let value = match literal {
        Some(literal) => coerce(command, param, literal)?,
        None if param.declared_type() == TypeTag::Boolean => Value::Bool(true),
        None => {
            return Err(DispatchError::MissingOptionValue {
                command: command.name().to_string(),
                option: name.to_string(),
            })
        }
    };
    Ok((param.name(), value))
}

fn coerce(
    command: &CommandDescriptor,
    param: &ParameterDescriptor,
    literal: &str,
) -> std::result::Result<Value, DispatchError> {
    param
        .declared_type()
        .coerce(literal)
        .ok_or_else(|| DispatchError::TypeCoercion {
            command: command.name().to_string(),
            parameter: param.name().to_string(),
            literal: literal.to_string(),
            expected: param.declared_type(),
        })
}

/// Fills in the command name on conversion errors raised inside a callable.
fn attribute(err: Error, name: &str) -> Error {
    match err {
        Error::Dispatch(DispatchError::TypeCoercion {
            command,
            parameter,
            literal,
            expected,
        }) if command.is_empty() => Error::Dispatch(DispatchError::TypeCoercion {
            command: name.to_string(),
            parameter,
            literal,
            expected,
        }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn param(name: &str, index: usize) -> ParameterDescriptor {
        ParameterDescriptor::new(name, index).unwrap()
    }

    fn copy() -> CommandDescriptor {
        CommandDescriptor::builder("copy")
            .parameter(param("src", 0))
            .parameter(param("dst", 1))
            .parameter(param("retries", 2).with_type(TypeTag::Integer).with_default(3i64))
            .parameter(param("force", 3).with_type(TypeTag::Boolean).with_default(false))
            .build()
            .unwrap()
    }

    fn bound(command: &CommandDescriptor, items: &[&str]) -> Arguments {
        match bind(command, &tokens(items)).unwrap() {
            Binding::Bound(args) => args,
            Binding::Help => panic!("expected bound arguments"),
        }
    }

    #[test]
    fn test_bind_positional_and_defaults() {
        let args = bound(&copy(), &["a.txt", "b.txt"]);
        assert_eq!(args.get("src"), Some(&Value::Str("a.txt".into())));
        assert_eq!(args.get("dst"), Some(&Value::Str("b.txt".into())));
        assert_eq!(args.get("retries"), Some(&Value::Int(3)));
        assert_eq!(args.get("force"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_bound_arguments_follow_declaration_order() {
        let args = bound(&copy(), &["--force", "--retries=1", "a", "b"]);
        let names: Vec<_> = args.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["src", "dst", "retries", "force"]);
    }

    #[test]
    fn test_options_interleave_with_positionals() {
        let args = bound(&copy(), &["a", "--retries=7", "b"]);
        assert_eq!(args.get("dst"), Some(&Value::Str("b".into())));
        assert_eq!(args.get("retries"), Some(&Value::Int(7)));
    }

    #[test]
    fn test_required_parameter_rejected_as_option() {
        for items in [&["--src=a", "b"][..], &["a", "b", "--dst=c"], &["--src"]] {
            let err = bind(&copy(), &tokens(items)).unwrap_err();
            assert!(
                matches!(err, DispatchError::PositionalOnly { .. }),
                "{items:?}: {err:?}"
            );
        }
        let err = bind(&copy(), &tokens(&["--src=a", "b"])).unwrap_err();
        assert_eq!(
            err,
            DispatchError::PositionalOnly {
                command: "copy".into(),
                parameter: "src".into(),
            }
        );
    }

    #[test]
    fn test_repeated_option_keeps_last() {
        let args = bound(&copy(), &["a", "b", "--retries=1", "--retries=2"]);
        assert_eq!(args.get("retries"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_end_of_options_marker() {
        let args = bound(&copy(), &["--", "--weird", "-x"]);
        assert_eq!(args.get("src"), Some(&Value::Str("--weird".into())));
        assert_eq!(args.get("dst"), Some(&Value::Str("-x".into())));
    }

    #[test]
    fn test_help_among_options() {
        assert_eq!(bind(&copy(), &tokens(&["a", "--help"])).unwrap(), Binding::Help);
    }

    #[test]
    fn test_missing_required_names_first_unfilled() {
        let err = bind(&copy(), &tokens(&["a"])).unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingRequiredArgument {
                command: "copy".into(),
                parameter: "dst".into()
            }
        );
    }

    #[test]
    fn test_unknown_option() {
        let err = bind(&copy(), &tokens(&["a", "b", "--nope"])).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownOption { option, .. } if option == "nope"));
    }

    #[test]
    fn test_option_without_value() {
        let err = bind(&copy(), &tokens(&["a", "b", "--retries"])).unwrap_err();
        assert!(matches!(err, DispatchError::MissingOptionValue { option, .. } if option == "retries"));
    }

    #[test]
    fn test_unexpected_argument() {
        let err = bind(&copy(), &tokens(&["a", "b", "c"])).unwrap_err();
        assert!(matches!(err, DispatchError::UnexpectedArgument { token, .. } if token == "c"));
    }

    #[test]
    fn test_type_coercion_error() {
        let err = bind(&copy(), &tokens(&["a", "b", "--retries=many"])).unwrap_err();
        assert_eq!(
            err,
            DispatchError::TypeCoercion {
                command: "copy".into(),
                parameter: "retries".into(),
                literal: "many".into(),
                expected: TypeTag::Integer,
            }
        );
    }

    #[test]
    fn test_empty_option_value_for_string() {
        let cmd = CommandDescriptor::builder("tag")
            .parameter(param("label", 0).with_default(Value::None))
            .build()
            .unwrap();
        let args = bound(&cmd, &["--label="]);
        assert_eq!(args.get("label"), Some(&Value::Str(String::new())));
    }

    #[test]
    fn test_attribute_fills_empty_command() {
        let err = Error::Dispatch(DispatchError::TypeCoercion {
            command: String::new(),
            parameter: "n".into(),
            literal: "999".into(),
            expected: TypeTag::Integer,
        });
        let err = attribute(err, "small");
        assert_eq!(err.as_dispatch().and_then(DispatchError::command), Some("small"));
    }
}
