//! Parameter and return-value descriptors.

use serde::Serialize;

use crate::error::DescriptorError;
use crate::registry::HELP;
use crate::value::{TypeTag, Value};

/// One parameter of a command.
///
/// A parameter with a default is optional and bound with `--name=value`;
/// one without must be supplied positionally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescriptor {
    name: String,
    declared_type: TypeTag,
    default: Option<Value>,
    documentation: String,
    index: usize,
}

impl ParameterDescriptor {
    /// Creates a required parameter at declaration position `index`.
    ///
    /// `help` is rejected: `--help` always renders the command's help.
    pub fn new(name: impl Into<String>, index: usize) -> Result<Self, DescriptorError> {
        let name = name.into();
        validate_name("parameter", &name)?;
        if name == HELP {
            return Err(DescriptorError::ReservedName {
                kind: "parameter",
                name,
            });
        }
        Ok(Self {
            name,
            declared_type: TypeTag::Unspecified,
            default: None,
            documentation: String::new(),
            index,
        })
    }

    pub fn with_type(mut self, declared_type: TypeTag) -> Self {
        self.declared_type = declared_type;
        self
    }

    /// Gives the parameter a default, making it optional.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declared_type(&self) -> TypeTag {
        self.declared_type
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Boolean optional parameters are spelled as bare `--name` flags.
    pub fn is_flag(&self) -> bool {
        self.has_default() && self.declared_type == TypeTag::Boolean
    }

    /// The usage fragment for this parameter, e.g. `<path>` or `[--count=<int>]`.
    pub fn usage(&self) -> String {
        if !self.has_default() {
            return format!("<{}>", self.name);
        }
        match self.declared_type {
            TypeTag::Boolean => format!("[--{}]", self.name),
            TypeTag::Unspecified => {
                let prefix: String = self.name.chars().take(2).collect();
                format!("[--{}=<{}>]", self.name, prefix)
            }
            other => format!(
                "[--{}=<{}>]",
                self.name,
                other.type_name().unwrap_or_default()
            ),
        }
    }
}

/// The documented return contract of a command. Descriptive only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReturnDescriptor {
    documentation: String,
    declared_type: TypeTag,
}

impl ReturnDescriptor {
    pub fn new(documentation: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            documentation: documentation.into(),
            declared_type,
        }
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn declared_type(&self) -> TypeTag {
        self.declared_type
    }
}

/// Checks that `name` can be written as `--name` and `--name=value`.
pub(crate) fn validate_name(kind: &'static str, name: &str) -> Result<(), DescriptorError> {
    if name.is_empty() {
        return Err(DescriptorError::EmptyName { kind });
    }
    if name.starts_with('-') || name.contains('=') || name.chars().any(char::is_whitespace) {
        return Err(DescriptorError::MalformedName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}
