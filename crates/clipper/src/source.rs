//! The source unit handed to discovery.
//!
//! A [`SourceUnit`] is what the outside world knows about one module: its
//! name, documentation and version, plus its top-level functions in
//! declaration order. Each [`FunctionDef`] carries the function's raw doc
//! comment, its parameter signature, its callable, and whether its author
//! opted it in as a command.
//!
//! The `#[command]` attribute generates a `<fn>__command()` sibling returning
//! an opted-in `FunctionDef`, and `commands![..]` collects them:
//!
//! ```rust,ignore
//! use clipper::{command, commands, CommandRegistry, SourceUnit};
//!
//! /// Says hello.
//! #[command]
//! fn greet(name: String) -> String {
//!     format!("Hello, {name}!")
//! }
//!
//! let unit = SourceUnit::new("hello")
//!     .version(env!("CARGO_PKG_VERSION"))
//!     .functions(commands![greet]);
//! let registry = CommandRegistry::from_source(unit)?;
//! ```

use tracing::trace;

use crate::command::{callable, Callable, CommandDescriptor, IntoCommandResult};
use crate::docs::DocComment;
use crate::error::DescriptorError;
use crate::param::{ParameterDescriptor, ReturnDescriptor};
use crate::value::{Arguments, TypeTag, Value};

/// Signature entry of one function parameter, before documentation is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub declared_type: TypeTag,
    pub default: Option<Value>,
}

/// A top-level function of a source unit.
pub struct FunctionDef {
    name: String,
    doc: String,
    parameters: Vec<ParameterSpec>,
    returns: TypeTag,
    opted_in: bool,
    invoke: Callable,
}

impl FunctionDef {
    /// Describes a function that is not (yet) opted in as a command.
    pub fn new<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Arguments) -> R + Send + Sync + 'static,
        R: IntoCommandResult,
    {
        Self {
            name: name.into(),
            doc: String::new(),
            parameters: Vec::new(),
            returns: TypeTag::Unspecified,
            opted_in: false,
            invoke: callable(f),
        }
    }

    /// Marks this function as a command.
    pub fn opt_in(mut self) -> Self {
        self.opted_in = true;
        self
    }

    /// Attaches the raw doc comment text.
    pub fn doc(mut self, text: impl Into<String>) -> Self {
        self.doc = text.into();
        self
    }

    /// Appends the next parameter of the signature.
    pub fn parameter(
        mut self,
        name: impl Into<String>,
        declared_type: TypeTag,
        default: Option<Value>,
    ) -> Self {
        self.parameters.push(ParameterSpec {
            name: name.into(),
            declared_type,
            default,
        });
        self
    }

    pub fn returns(mut self, declared_type: TypeTag) -> Self {
        self.returns = declared_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_command(&self) -> bool {
        self.opted_in
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Turns the definition into a descriptor, attaching documentation
    /// parsed from the doc comment. Undocumented parameters get empty
    /// documentation.
    pub fn into_descriptor(self) -> Result<CommandDescriptor, DescriptorError> {
        let doc = DocComment::parse(&self.doc);

        let parameters = self
            .parameters
            .into_iter()
            .enumerate()
            .map(|(index, spec)| {
                let mut param = ParameterDescriptor::new(spec.name, index)?
                    .with_type(spec.declared_type);
                if let Some(default) = spec.default {
                    param = param.with_default(default);
                }
                if let Some(text) = documentation_for(&doc, param.name()) {
                    param = param.with_documentation(text);
                }
                Ok(param)
            })
            .collect::<Result<Vec<_>, DescriptorError>>()?;

        for (documented, _) in &doc.parameters {
            if !parameters
                .iter()
                .any(|p| p.name() == documented.replace('_', "-"))
            {
                trace!(
                    function = %self.name,
                    parameter = %documented,
                    "doc comment names a parameter the signature lacks"
                );
            }
        }

        let returns = ReturnDescriptor::new(doc.returns.unwrap_or_default(), self.returns);

        CommandDescriptor::new(self.name, doc.summary, parameters, returns, self.invoke)
    }
}

/// Doc comments name parameters as written in Rust (`dry_run`), options are
/// spelled with hyphens (`--dry-run`).
fn documentation_for<'d>(doc: &'d DocComment, name: &str) -> Option<&'d str> {
    doc.parameter(name)
        .or_else(|| doc.parameter(&name.replace('-', "_")))
}

impl std::fmt::Debug for FunctionDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionDef")
            .field("name", &self.name)
            .field("opted_in", &self.opted_in)
            .field("parameters", &self.parameters)
            .field("returns", &self.returns)
            .finish_non_exhaustive()
    }
}

/// One module's worth of functions, as resolved by the caller.
#[derive(Debug)]
pub struct SourceUnit {
    pub(crate) name: String,
    pub(crate) documentation: Option<String>,
    pub(crate) version: Option<String>,
    pub(crate) functions: Vec<FunctionDef>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            version: None,
            functions: Vec::new(),
        }
    }

    pub fn documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = Some(documentation.into());
        self
    }

    /// Sets the version. An empty string means no version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = (!version.is_empty()).then_some(version);
        self
    }

    /// Appends one top-level function. Order of calls is declaration order.
    pub fn function(mut self, def: FunctionDef) -> Self {
        self.functions.push(def);
        self
    }

    pub fn functions(mut self, defs: impl IntoIterator<Item = FunctionDef>) -> Self {
        self.functions.extend(defs);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
