//! The command registry.
//!
//! A [`CommandRegistry`] holds every command discovered for one source unit,
//! plus the module-level name, documentation and version. It renders the
//! module help screen and resolves command names for the dispatcher.
//!
//! Registries are built once and are read-only afterwards.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, trace};

use crate::command::{CommandDescriptor, NO_DOCUMENTATION};
use crate::config::HelpConfig;
use crate::error::{DescriptorError, DispatchError};
use crate::param::validate_name;
use crate::source::SourceUnit;

/// Reserved module-level option names.
pub const HELP: &str = "help";
pub const VERSION: &str = "version";

/// All commands of one source unit.
#[derive(Debug, Serialize)]
pub struct CommandRegistry {
    name: String,
    documentation: String,
    version: Option<String>,
    commands: Vec<CommandDescriptor>,
    #[serde(skip)]
    config: HelpConfig,
}

impl CommandRegistry {
    /// Starts a [`RegistryBuilder`] for explicit registration.
    pub fn builder(name: impl Into<String>) -> RegistryBuilder {
        RegistryBuilder::new(name)
    }

    /// Runs discovery over a source unit.
    ///
    /// Functions that are opted in become commands, in declaration order.
    /// All others are skipped.
    pub fn from_source(unit: SourceUnit) -> Result<Self, DescriptorError> {
        let mut builder = RegistryBuilder::new(unit.name);
        if let Some(doc) = unit.documentation {
            builder = builder.documentation(doc);
        }
        if let Some(version) = unit.version {
            builder = builder.version(version);
        }

        for def in unit.functions {
            if !def.is_command() {
                trace!(function = def.name(), "skipping function not marked as a command");
                continue;
            }
            let descriptor = def.into_descriptor()?;
            debug!(
                command = descriptor.name(),
                parameters = descriptor.parameters().len(),
                "discovered command"
            );
            builder = builder.command(descriptor);
        }

        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    pub fn config(&self) -> &HelpConfig {
        &self.config
    }

    /// Replaces the rendering configuration.
    pub fn with_config(mut self, config: HelpConfig) -> Self {
        self.config = config;
        self
    }

    /// The name printed at the start of usage lines.
    pub fn container(&self) -> &str {
        self.config.program.as_deref().unwrap_or(&self.name)
    }

    /// Commands in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.iter().find(|c| c.name() == name)
    }

    /// Resolves a command name.
    pub fn lookup(&self, name: &str) -> Result<&CommandDescriptor, DispatchError> {
        self.get(name)
            .ok_or_else(|| DispatchError::UnknownCommand(name.to_string()))
    }

    fn reserved_length(&self) -> usize {
        if self.has_version() {
            VERSION.len()
        } else {
            HELP.len()
        }
    }

    /// Longest parameter name across every command, never shorter than the
    /// reserved option names.
    pub fn longest_parameter_name_length(&self) -> usize {
        self.commands
            .iter()
            .map(CommandDescriptor::longest_parameter_name_length)
            .chain(std::iter::once(self.reserved_length()))
            .max()
            .unwrap_or(0)
    }

    /// Renders the module help screen.
    pub fn help(&self) -> String {
        let config = &self.config;
        let container = self.container();
        let width = self.longest_parameter_name_length() + 2;

        let mut lines = vec![
            self.documentation.clone(),
            String::new(),
            "Usage:".to_string(),
        ];
        for command in &self.commands {
            lines.push(format!("{}{}", config.indent, command.usage_line(container)));
        }
        lines.push(format!("{}{} --{}", config.indent, container, HELP));
        if self.has_version() {
            lines.push(format!("{}{} --{}", config.indent, container, VERSION));
        }

        lines.push(String::new());
        lines.push("Options:".to_string());
        lines.push(config.row(&format!("--{}", HELP), width, &config.help_text));
        if self.has_version() {
            lines.push(config.row(&format!("--{}", VERSION), width, &config.version_text));
        }

        let mut seen = HashSet::new();
        for param in self.commands.iter().flat_map(|c| c.optional_parameters()) {
            if seen.insert(param.name()) {
                let option = format!("--{}", param.name());
                lines.push(config.row(&option, width, param.documentation()));
            }
        }

        lines.join("\n")
    }

    /// Renders one command's help screen.
    pub fn command_help(&self, name: &str) -> Result<String, DispatchError> {
        self.lookup(name)
            .map(|command| command.help(self.container(), &self.config))
    }

    /// The guidance line printed after a dispatch error.
    pub fn usage_hint(&self, error: &DispatchError) -> String {
        match error.command().filter(|c| self.get(c).is_some()) {
            Some(command) => format!(
                "Run '{} {} --help' for usage.",
                self.container(),
                command
            ),
            None => format!("Run '{} --help' for usage.", self.container()),
        }
    }

    /// Exports the command table (names, parameters, types, defaults and
    /// documentation) as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Builder for a [`CommandRegistry`].
#[derive(Debug)]
pub struct RegistryBuilder {
    name: String,
    documentation: Option<String>,
    version: Option<String>,
    commands: Vec<CommandDescriptor>,
    config: HelpConfig,
}

impl RegistryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documentation: None,
            version: None,
            commands: Vec::new(),
            config: HelpConfig::default(),
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

    pub fn command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }

    pub fn config(mut self, config: HelpConfig) -> Self {
        self.config = config;
        self
    }

    /// Validates command names and builds the registry.
    pub fn build(self) -> Result<CommandRegistry, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyName { kind: "module" });
        }

        let mut names = HashSet::new();
        for command in &self.commands {
            let name = command.name();
            validate_name("command", name)?;
            if name == HELP || (name == VERSION && self.version.is_some()) {
                return Err(DescriptorError::ReservedName {
                    kind: "command",
                    name: name.to_string(),
                });
            }
            if !names.insert(name) {
                return Err(DescriptorError::DuplicateCommand(name.to_string()));
            }
        }

        let documentation = self
            .documentation
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| NO_DOCUMENTATION.to_string());

        debug!(
            module = %self.name,
            commands = self.commands.len(),
            version = self.version.as_deref().unwrap_or("-"),
            "built command registry"
        );

        Ok(CommandRegistry {
            name: self.name,
            documentation,
            version: self.version,
            commands: self.commands,
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParameterDescriptor;
    use crate::value::{TypeTag, Value};

    fn command(name: &str) -> CommandDescriptor {
        CommandDescriptor::builder(name).build().unwrap()
    }

    fn sample() -> CommandRegistry {
        let add = CommandDescriptor::builder("add")
            .documentation("Adds numbers.")
            .parameter(ParameterDescriptor::new("a", 0).unwrap().with_type(TypeTag::Integer))
            .parameter(
                ParameterDescriptor::new("scale", 1)
                    .unwrap()
                    .with_type(TypeTag::Float)
                    .with_default(1.0)
                    .with_documentation("Multiplier."),
            )
            .build()
            .unwrap();
        let show = CommandDescriptor::builder("show")
            .parameter(
                ParameterDescriptor::new("verbose", 0)
                    .unwrap()
                    .with_type(TypeTag::Boolean)
                    .with_default(false)
                    .with_documentation("Print more."),
            )
            .build()
            .unwrap();
        CommandRegistry::builder("calc")
            .documentation("  A calculator.\n")
            .version("1.2.3")
            .command(add)
            .command(show)
            .build()
            .unwrap()
    }

    #[test]
    fn test_lookup() {
        let registry = sample();
        assert_eq!(registry.lookup("add").unwrap().name(), "add");
        assert_eq!(
            registry.lookup("frobnicate").unwrap_err(),
            DispatchError::UnknownCommand("frobnicate".into())
        );
    }

    #[test]
    fn test_metadata() {
        let registry = sample();
        assert_eq!(registry.name(), "calc");
        assert_eq!(registry.documentation(), "A calculator.");
        assert_eq!(registry.version(), Some("1.2.3"));
        assert!(registry.has_version());
        assert_eq!(registry.len(), 2);
        let names: Vec<_> = registry.commands().map(|c| c.name()).collect();
        assert_eq!(names, vec!["add", "show"]);
    }

    #[test]
    fn test_duplicate_command_rejected() {
        let err = CommandRegistry::builder("m")
            .command(command("run"))
            .command(command("run"))
            .build()
            .unwrap_err();
        assert_eq!(err, DescriptorError::DuplicateCommand("run".into()));
    }

    #[test]
    fn test_reserved_names_rejected() {
        let err = CommandRegistry::builder("m")
            .command(command("help"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::ReservedName {
                kind: "command",
                name: "help".into()
            }
        );

        // "version" is only reserved when the module has one
        assert!(CommandRegistry::builder("m")
            .command(command("version"))
            .build()
            .is_ok());
        assert!(CommandRegistry::builder("m")
            .version("1.0")
            .command(command("version"))
            .build()
            .is_err());
    }

    #[test]
    fn test_longest_falls_back_to_reserved_tokens() {
        let registry = CommandRegistry::builder("m").build().unwrap();
        assert_eq!(registry.longest_parameter_name_length(), 4);

        let registry = CommandRegistry::builder("m").version("0.1").build().unwrap();
        assert_eq!(registry.longest_parameter_name_length(), 7);

        assert_eq!(sample().longest_parameter_name_length(), 7);
    }

    #[test]
    fn test_help_layout() {
        let expected = "\
A calculator.

Usage:
    calc add <a> [--scale=<float>]
    calc show [--verbose]
    calc --help
    calc --version

Options:
    --help     Show this screen.
    --version  Show version information.
    --scale    Multiplier.
    --verbose  Print more.";
        assert_eq!(sample().help(), expected);
    }

    #[test]
    fn test_help_uses_configured_program() {
        let registry = sample().with_config(HelpConfig::default().program("calc-cli"));
        assert!(registry.help().contains("    calc-cli add <a>"));
        assert_eq!(registry.container(), "calc-cli");
    }

    #[test]
    fn test_help_without_version() {
        let registry = CommandRegistry::builder("m").build().unwrap();
        let help = registry.help();
        assert!(!help.contains("--version"));
        assert!(help.starts_with(NO_DOCUMENTATION));
    }

    #[test]
    fn test_shared_optional_parameter_listed_once() {
        let flag = || {
            ParameterDescriptor::new("dry-run", 0)
                .unwrap()
                .with_type(TypeTag::Boolean)
                .with_default(Value::Bool(false))
        };
        let registry = CommandRegistry::builder("m")
            .command(CommandDescriptor::builder("a").parameter(flag()).build().unwrap())
            .command(CommandDescriptor::builder("b").parameter(flag()).build().unwrap())
            .build()
            .unwrap();
        assert_eq!(registry.help().matches("    --dry-run").count(), 1);
    }

    #[test]
    fn test_usage_hint() {
        let registry = sample();
        let hint = registry.usage_hint(&DispatchError::UnknownCommand("x".into()));
        assert_eq!(hint, "Run 'calc --help' for usage.");

        let hint = registry.usage_hint(&DispatchError::MissingRequiredArgument {
            command: "add".into(),
            parameter: "a".into(),
        });
        assert_eq!(hint, "Run 'calc add --help' for usage.");
    }

    #[test]
    fn test_to_json() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "calc");
        assert_eq!(json["commands"][0]["name"], "add");
        assert_eq!(json["commands"][0]["parameters"][1]["declared_type"], "float");
        assert_eq!(json["commands"][0]["parameters"][1]["default"], 1.0);
    }
}
