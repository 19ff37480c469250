//! Proc macros for clipper.
//!
//! # Available Macros
//!
//! - [`command`](macro@command) - Mark a function as a command and extract its
//!   metadata at compile time
//! - [`commands!`] - Collect the generated definitions of several commands
//!
//! These macros expand to paths under `::clipper`, so use them through the
//! `clipper` crate's re-exports rather than depending on this crate directly.
//!
//! For working examples, see `clipper/tests/command_macro.rs`.

mod command;

use proc_macro::TokenStream;

/// Marks a free function as a command.
///
/// Generates a hidden sibling `<fn>__command()` returning an opted-in
/// `clipper::FunctionDef`: the function's doc comment, its parameters (name,
/// type, default) in declaration order, its return type and a wrapper that
/// binds `Arguments` to the function's parameters.
///
/// # Parameters
///
/// - Plain `T`: required, bound positionally.
/// - `Option<T>`: optional, default `None`.
/// - `#[flag] name: bool`: optional `--name`, default `false`.
/// - `#[arg(default = <literal>)]`: optional `--name=value`.
/// - `#[arg(name = "x")]` / `#[flag(name = "x")]`: renames the option.
///
/// Underscores in parameter and function names become hyphens
/// (`dry_run` → `--dry-run`).
///
/// # Example
///
/// ```rust,ignore
/// use clipper::command;
///
/// /// Greets someone.
/// ///
/// /// # Arguments
/// ///
/// /// * `name` - Who to greet.
/// #[command]
/// fn greet(name: String, #[flag] shout: bool) -> String {
///     let text = format!("Hello, {name}!");
///     if shout { text.to_uppercase() } else { text }
/// }
///
/// let def = greet__command();
/// ```
///
/// # Errors
///
/// Fails to compile for methods, generic or async functions, reference
/// parameters, and `#[flag]` on a non-`bool` parameter.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::command_impl(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Collects the definitions of `#[command]` functions, in order.
///
/// `commands![add, tools::greet]` expands to
/// `vec![add__command(), tools::greet__command()]`.
#[proc_macro]
pub fn commands(input: TokenStream) -> TokenStream {
    command::commands_impl(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
