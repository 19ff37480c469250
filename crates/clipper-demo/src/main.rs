//! A small CLI built with clipper.
//!
//! ```text
//! $ clipper-demo add 2 3
//! 5
//! $ clipper-demo greet Ada --times=2 --shout
//! HELLO, ADA!
//! HELLO, ADA!
//! $ clipper-demo divide 1 0
//! error: cannot divide by zero
//! ```
//!
//! Set `CLIPPER_LOG=debug` to trace discovery and dispatch on stderr.

mod commands;

use std::process::ExitCode;

use clipper::{
    commands, Arguments, CommandRegistry, Error, FunctionDef, HelpConfig, Outcome, SourceUnit,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CLIPPER_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_registry() -> clipper::Result<CommandRegistry> {
    let unit = SourceUnit::new(env!("CARGO_PKG_NAME"))
        .documentation(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .functions(commands![
            commands::add,
            commands::divide,
            commands::greet,
            commands::word_count
        ])
        // listed but not opted in, so discovery skips it
        .function(FunctionDef::new("helper", |_: &Arguments| {
            Ok::<_, anyhow::Error>(commands::helper())
        }));

    let registry = CommandRegistry::from_source(unit)?
        .with_config(HelpConfig::default().program(env!("CARGO_BIN_NAME")));
    Ok(registry)
}

fn main() -> ExitCode {
    init_logging();

    let registry = match build_registry() {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    debug!(commands = registry.len(), "registry ready");

    match registry.dispatch(std::env::args().skip(1)) {
        Ok(Outcome::Help(text)) | Ok(Outcome::Version(text)) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Returned(value)) => {
            if !value.is_none() {
                println!("{value}");
            }
            ExitCode::SUCCESS
        }
        Err(Error::Dispatch(e)) => {
            eprintln!("error: {e}");
            eprintln!("{}", registry.usage_hint(&e));
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
