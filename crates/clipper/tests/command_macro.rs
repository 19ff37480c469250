//! Integration tests for the #[command] proc macro.

#![allow(non_snake_case)] // Generated definitions use the __command suffix

use std::path::PathBuf;

use clipper::{
    command, commands, CommandRegistry, DispatchError, Error, FunctionDef, Outcome, SourceUnit,
    TypeTag, Value,
};

// =============================================================================
// Commands under test
// =============================================================================

/// Adds two numbers.
///
/// # Arguments
///
/// * `a` - The first number.
/// * `b` - The second number.
///
/// # Returns
///
/// The sum of both.
#[command]
fn add(a: i64, b: i64) -> i64 {
    a + b
}

/// Greets someone.
///
/// # Arguments
///
/// * `name` - Who to greet.
/// * `greeting` - Greeting word.
/// * `loud` - Shout it.
#[command]
fn greet(name: String, #[arg(default = "Hello")] greeting: String, #[flag] loud: bool) -> String {
    let text = format!("{greeting}, {name}!");
    if loud {
        text.to_uppercase()
    } else {
        text
    }
}

/// Fails on purpose.
#[command]
fn explode(#[arg(default = false)] really: bool) -> anyhow::Result<()> {
    if really {
        anyhow::bail!("kaboom");
    }
    Ok(())
}

/// Renamed command with renamed option and optional parameter.
#[command(name = "ls")]
fn list_files(
    dir: PathBuf,
    #[arg(name = "max")] max_entries: Option<u32>,
    #[flag] show_hidden: bool,
) -> String {
    format!(
        "{} {:?} {}",
        dir.display(),
        max_entries,
        show_hidden
    )
}

/// Scales a number.
#[command]
fn scale(value: f64, #[arg(default = -1.5)] factor: f64, #[arg(default = 255)] limit: u8) -> f64 {
    (value * factor).min(f64::from(limit))
}

/// Returns nothing.
#[command]
fn noop() {}

fn registry() -> CommandRegistry {
    let unit = SourceUnit::new("tool")
        .documentation("A test tool.")
        .version("9.9.9")
        .functions(commands![add, greet, explode, list_files, scale, noop]);
    CommandRegistry::from_source(unit).unwrap()
}

fn run(argv: &[&str]) -> clipper::Result<Outcome> {
    registry().dispatch(argv.iter().copied())
}

fn returned(argv: &[&str]) -> Value {
    match run(argv).unwrap() {
        Outcome::Returned(value) => value,
        other => panic!("expected a returned value, got {other:?}"),
    }
}

// =============================================================================
// Generated metadata
// =============================================================================

#[test]
fn test_generated_definition_is_opted_in() {
    let def = add__command();
    assert_eq!(def.name(), "add");
    assert!(def.is_command());
    let names: Vec<_> = def.parameters().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(def.parameters()[0].declared_type, TypeTag::Integer);
}

#[test]
fn test_descriptor_from_doc_comment() {
    let registry = registry();
    let add = registry.get("add").unwrap();
    assert_eq!(add.documentation(), "Adds two numbers.");
    assert_eq!(add.parameter("a").unwrap().documentation(), "The first number.");
    assert_eq!(add.returns().documentation(), "The sum of both.");
    assert_eq!(add.returns().declared_type(), TypeTag::Integer);
}

#[test]
fn test_defaults_from_annotations() {
    let registry = registry();
    let greet = registry.get("greet").unwrap();
    assert_eq!(
        greet.parameter("greeting").unwrap().default(),
        Some(&Value::Str("Hello".into()))
    );
    assert_eq!(greet.parameter("loud").unwrap().default(), Some(&Value::Bool(false)));
    assert!(greet.parameter("loud").unwrap().is_flag());
    assert!(!greet.parameter("name").unwrap().has_default());
}

#[test]
fn test_names_and_renames() {
    let registry = registry();
    let ls = registry.get("ls").unwrap();
    assert!(registry.get("list-files").is_none());
    assert!(ls.parameter("max").is_some());
    assert!(ls.parameter("show-hidden").is_some());
    assert_eq!(ls.parameter("max").unwrap().default(), Some(&Value::None));
}

#[test]
fn test_declaration_order_preserved() {
    let names: Vec<_> = registry().commands().map(|c| c.name().to_string()).collect();
    assert_eq!(names, vec!["add", "greet", "explode", "ls", "scale", "noop"]);
}

#[test]
fn test_unmarked_functions_are_skipped() {
    let unit = SourceUnit::new("tool")
        .functions(commands![add])
        .function(FunctionDef::new("hidden", |_: &clipper::Arguments| {
            Ok::<_, anyhow::Error>(1i64)
        }));
    let registry = CommandRegistry::from_source(unit).unwrap();
    assert_eq!(registry.len(), 1);
    assert!(registry.get("hidden").is_none());
}

// =============================================================================
// Dispatch through generated wrappers
// =============================================================================

#[test]
fn test_dispatch_add() {
    assert_eq!(returned(&["add", "2", "40"]), Value::Int(42));
}

#[test]
fn test_dispatch_greet_with_options() {
    assert_eq!(returned(&["greet", "Ada"]), Value::Str("Hello, Ada!".into()));
    assert_eq!(
        returned(&["greet", "Ada", "--greeting=Hi", "--loud"]),
        Value::Str("HI, ADA!".into())
    );
}

#[test]
fn test_dispatch_optional_parameter() {
    assert_eq!(
        returned(&["ls", "/tmp"]),
        Value::Str("/tmp None false".into())
    );
    assert_eq!(
        returned(&["ls", "/tmp", "--max=3", "--show-hidden"]),
        Value::Str("/tmp Some(3) true".into())
    );
}

#[test]
fn test_dispatch_negative_float_default() {
    assert_eq!(returned(&["scale", "2"]), Value::Float(-3.0));
    assert_eq!(returned(&["scale", "2", "--factor=200"]), Value::Float(255.0));
}

#[test]
fn test_unit_return_is_none() {
    assert_eq!(returned(&["noop"]), Value::None);
    assert_eq!(returned(&["explode"]), Value::None);
}

#[test]
fn test_application_error_passes_through() {
    let err = run(&["explode", "--really"]).unwrap_err();
    assert!(matches!(err, Error::Application(_)));
    assert_eq!(err.to_string(), "kaboom");
}

#[test]
fn test_out_of_range_integer_is_a_usage_error() {
    let err = run(&["ls", "/tmp", "--max=-1"]).unwrap_err();
    assert_eq!(
        err.as_dispatch(),
        Some(&DispatchError::TypeCoercion {
            command: "ls".into(),
            parameter: "max".into(),
            literal: "-1".into(),
            expected: TypeTag::Integer,
        })
    );
}

#[test]
fn test_command_help_from_doc_comment() {
    match run(&["greet", "--help"]).unwrap() {
        Outcome::Help(text) => {
            assert!(text.starts_with("Greets someone."));
            assert!(text.contains("    tool greet <name> [--greeting=<str>] [--loud]"));
            assert!(text.contains("    name      Who to greet."));
            assert!(text.contains("    --loud      Shout it."));
        }
        other => panic!("expected help, got {other:?}"),
    }
}
