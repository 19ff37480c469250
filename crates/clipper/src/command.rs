//! Command descriptors.
//!
//! A [`CommandDescriptor`] wraps one opted-in function: its name, its
//! documentation, its parameters in declaration order, its return contract and
//! the callable that runs it. Descriptors are built once during discovery and
//! are immutable afterwards.
//!
//! # Callables
//!
//! The callable receives the bound [`Arguments`] and returns a [`Value`].
//! Anything implementing [`IntoCommandResult`] can be returned from the
//! closure, so both of these work:
//!
//! ```rust
//! use clipper::{Arguments, CommandDescriptor, ParameterDescriptor, TypeTag, Value};
//!
//! let add = CommandDescriptor::builder("add")
//!     .documentation("Adds two numbers.")
//!     .parameter(ParameterDescriptor::new("a", 0)?.with_type(TypeTag::Integer))
//!     .parameter(ParameterDescriptor::new("b", 1)?.with_type(TypeTag::Integer))
//!     .callable(|args: &Arguments| {
//!         let a: i64 = args.take("a")?;
//!         let b: i64 = args.take("b")?;
//!         Ok::<_, anyhow::Error>(a + b)
//!     })
//!     .build()?;
//!
//! let args = Arguments::new().with("a", 2i64).with("b", 3i64);
//! assert_eq!(add.invoke(&args)?, Value::Int(5));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::HelpConfig;
use crate::error::{DescriptorError, DispatchError, Error, Result};
use crate::param::{validate_name, ParameterDescriptor, ReturnDescriptor};
use crate::value::{Arguments, IntoValue, Value};

/// Documentation shown for commands and modules that have none.
pub const NO_DOCUMENTATION: &str = "No documentation provided.";

/// The boxed function a descriptor invokes.
pub type Callable = Box<dyn Fn(&Arguments) -> Result<Value> + Send + Sync>;

/// Types a command callable may return.
///
/// Errors are wrapped as [`Error::Application`], except errors that already
/// are clipper errors: a [`DispatchError`] raised by `args.take(..)?` is
/// reported as a dispatch error and an [`Error`] passes through as is.
pub trait IntoCommandResult {
    fn into_command_result(self) -> Result<Value>;
}

impl<T, E> IntoCommandResult for std::result::Result<T, E>
where
    T: IntoValue,
    E: Into<anyhow::Error>,
{
    fn into_command_result(self) -> Result<Value> {
        self.map(IntoValue::into_value).map_err(|e| {
            let e: anyhow::Error = e.into();
            let e = match e.downcast::<Error>() {
                Ok(err) => return err,
                Err(e) => e,
            };
            match e.downcast::<DispatchError>() {
                Ok(err) => Error::Dispatch(err),
                Err(e) => Error::Application(e),
            }
        })
    }
}

/// Wraps a closure returning any [`IntoCommandResult`] into a [`Callable`].
pub fn callable<F, R>(f: F) -> Callable
where
    F: Fn(&Arguments) -> R + Send + Sync + 'static,
    R: IntoCommandResult,
{
    Box::new(move |args| f(args).into_command_result())
}

/// Metadata and entry point for one command.
#[derive(Serialize)]
pub struct CommandDescriptor {
    name: String,
    documentation: String,
    parameters: Vec<ParameterDescriptor>,
    returns: ReturnDescriptor,
    #[serde(skip)]
    invoke: Callable,
}

impl CommandDescriptor {
    /// Creates a descriptor, validating its metadata.
    ///
    /// `parameters` may arrive in any order; they are stored by declaration
    /// index. Fails if the name is empty or malformed, or if two parameters
    /// share a name or an index.
    pub fn new(
        name: impl Into<String>,
        documentation: Option<String>,
        mut parameters: Vec<ParameterDescriptor>,
        returns: ReturnDescriptor,
        invoke: Callable,
    ) -> std::result::Result<Self, DescriptorError> {
        let name = name.into();
        validate_name("command", &name)?;

        let mut names = HashSet::new();
        let mut indices = HashSet::new();
        for param in &parameters {
            if !names.insert(param.name()) {
                return Err(DescriptorError::DuplicateParameter {
                    command: name,
                    parameter: param.name().to_string(),
                });
            }
            if !indices.insert(param.index()) {
                return Err(DescriptorError::DuplicateIndex {
                    command: name,
                    index: param.index(),
                });
            }
        }
        parameters.sort_by_key(ParameterDescriptor::index);

        let documentation = documentation
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DOCUMENTATION.to_string());

        Ok(Self {
            name,
            documentation,
            parameters,
            returns,
            invoke,
        })
    }

    /// Starts a [`CommandBuilder`].
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// All parameters in declaration order.
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    pub fn returns(&self) -> &ReturnDescriptor {
        &self.returns
    }

    /// Parameters without a default, in declaration order.
    pub fn required_parameters(&self) -> Vec<&ParameterDescriptor> {
        self.parameters_where(|p| !p.has_default())
    }

    /// Parameters with a default, in declaration order.
    pub fn optional_parameters(&self) -> Vec<&ParameterDescriptor> {
        self.parameters_where(ParameterDescriptor::has_default)
    }

    fn parameters_where(
        &self,
        keep: impl Fn(&ParameterDescriptor) -> bool,
    ) -> Vec<&ParameterDescriptor> {
        let mut result: Vec<_> = self.parameters.iter().filter(|p| keep(p)).collect();
        result.sort_by_key(|p| p.index());
        result
    }

    /// Length of the longest parameter name, or 0 without parameters.
    pub fn longest_parameter_name_length(&self) -> usize {
        self.parameters
            .iter()
            .map(|p| p.name().len())
            .max()
            .unwrap_or(0)
    }

    /// The one-line argument summary, e.g. `<src> <dst> [--force] [--mode=<mo>]`.
    pub fn usage_summary(&self) -> String {
        self.required_parameters()
            .into_iter()
            .chain(self.optional_parameters())
            .map(ParameterDescriptor::usage)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The `<container> <command> <summary>` usage line, without indentation.
    pub fn usage_line(&self, container: &str) -> String {
        let line = format!("{} {} {}", container, self.name, self.usage_summary());
        line.trim_end().to_string()
    }

    /// Renders this command's help screen.
    pub fn help(&self, container: &str, config: &HelpConfig) -> String {
        let width = self.longest_parameter_name_length().max("help".len());
        let mut lines = vec![
            self.documentation.clone(),
            String::new(),
            "Usage:".to_string(),
            format!("{}{}", config.indent, self.usage_line(container)),
        ];

        let required = self.required_parameters();
        if !required.is_empty() {
            lines.push(String::new());
            lines.push("Positional arguments:".to_string());
            for param in required {
                lines.push(config.row(param.name(), width, param.documentation()));
            }
        }

        lines.push(String::new());
        lines.push("Options:".to_string());
        lines.push(config.row("--help", width + 2, &config.help_text));
        for param in self.optional_parameters() {
            let option = format!("--{}", param.name());
            lines.push(config.row(&option, width + 2, param.documentation()));
        }

        lines.join("\n")
    }

    /// Calls the bound function. Errors from the function body propagate
    /// unchanged.
    pub fn invoke(&self, arguments: &Arguments) -> Result<Value> {
        (self.invoke)(arguments)
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("documentation", &self.documentation)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// Builder for registering a command by hand.
pub struct CommandBuilder {
    name: String,
    documentation: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    returns: ReturnDescriptor,
    invoke: Option<Callable>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            parameters: Vec::new(),
            returns: ReturnDescriptor::default(),
            invoke: None,
        }
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn returns(mut self, returns: ReturnDescriptor) -> Self {
        self.returns = returns;
        self
    }

    pub fn callable<F, R>(mut self, f: F) -> Self
    where
        F: Fn(&Arguments) -> R + Send + Sync + 'static,
        R: IntoCommandResult,
    {
        self.invoke = Some(callable(f));
        self
    }

    /// Builds the descriptor. A command without a callable returns [`Value::None`].
    pub fn build(self) -> std::result::Result<CommandDescriptor, DescriptorError> {
        let invoke = self
            .invoke
            .unwrap_or_else(|| Box::new(|_: &Arguments| Ok(Value::None)));
        CommandDescriptor::new(
            self.name,
            self.documentation,
            self.parameters,
            self.returns,
            invoke,
        )
    }
}
