//! Turn plain functions into command-line subcommands.
//!
//! `clipper` builds a command-line interface from the functions of a module:
//! each opted-in function becomes a subcommand, its parameters become
//! positional arguments (no default) or `--name=value` options (with a
//! default), and its doc comment becomes the help text.
//!
//! # Features
//!
//! - **Discovery**: `#[command]` marks a function and extracts its metadata
//!   at compile time; [`CommandRegistry::from_source`] collects the marked
//!   functions of a [`SourceUnit`] in declaration order
//! - **Help**: module and per-command help screens rendered from doc comments,
//!   configurable through [`HelpConfig`]
//! - **Dispatch**: [`Dispatcher`] selects a command from an argument vector,
//!   binds and coerces the arguments, and invokes it
//! - **Export**: [`CommandRegistry::to_json`] dumps the command table
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use clipper::{command, commands, CommandRegistry, Outcome, SourceUnit};
//!
//! /// Adds two numbers.
//! ///
//! /// # Arguments
//! ///
//! /// * `a` - The first number.
//! /// * `b` - The second number.
//! #[command]
//! fn add(a: i64, b: i64) -> i64 {
//!     a + b
//! }
//!
//! /// Greets someone.
//! #[command]
//! fn greet(name: String, #[flag] shout: bool) -> String {
//!     let greeting = format!("Hello, {name}!");
//!     if shout { greeting.to_uppercase() } else { greeting }
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let unit = SourceUnit::new(env!("CARGO_PKG_NAME"))
//!         .documentation(env!("CARGO_PKG_DESCRIPTION"))
//!         .version(env!("CARGO_PKG_VERSION"))
//!         .functions(commands![add, greet]);
//!     let registry = CommandRegistry::from_source(unit)?;
//!
//!     match registry.dispatch(std::env::args().skip(1))? {
//!         Outcome::Help(text) | Outcome::Version(text) => println!("{text}"),
//!         Outcome::Returned(value) => println!("{value}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ```text
//! $ calc add 2 3
//! 5
//! $ calc greet Ada --shout
//! HELLO, ADA!
//! $ calc add 2
//! missing required argument 'b' for command 'add'
//! ```
//!
//! # Without the macro
//!
//! Commands can be registered by hand with [`CommandDescriptor::builder`] and
//! [`CommandRegistry::builder`], or described as [`FunctionDef`]s and fed
//! through discovery.

mod command;
mod config;
mod dispatch;
mod docs;
mod error;
mod param;
mod registry;
mod source;
mod value;

pub use command::{
    callable, Callable, CommandBuilder, CommandDescriptor, IntoCommandResult, NO_DOCUMENTATION,
};
pub use config::HelpConfig;
pub use dispatch::{bind, Binding, Dispatcher, Outcome};
pub use docs::DocComment;
pub use error::{DescriptorError, DispatchError, Error, Result};
pub use param::{ParameterDescriptor, ReturnDescriptor};
pub use registry::{CommandRegistry, RegistryBuilder, HELP, VERSION};
pub use source::{FunctionDef, ParameterSpec, SourceUnit};
pub use value::{Arguments, FromValue, IntoValue, TypeTag, Value};

pub use clipper_macros::{command, commands};
