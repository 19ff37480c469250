//! Runtime values passed into and out of commands.
//!
//! [`TypeTag`] is the closed set of parameter types the dispatcher knows how
//! to coerce. [`Value`] is what a coerced token (or a default, or a command's
//! return) looks like at runtime. [`Arguments`] is the named mapping handed to
//! a command's callable.
//!
//! Macro-generated wrappers convert between these and plain Rust types with
//! [`FromValue`] and [`IntoValue`].

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::DispatchError;

/// Declared type of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    String,
    Integer,
    Float,
    Boolean,
    /// No declared type, or one outside the closed set. Treated as an opaque string.
    #[default]
    Unspecified,
}

impl TypeTag {
    /// Maps a Rust type name (the last path segment) to a tag.
    ///
    /// ```
    /// use clipper::TypeTag;
    ///
    /// assert_eq!(TypeTag::from_type_name("u16"), TypeTag::Integer);
    /// assert_eq!(TypeTag::from_type_name("PathBuf"), TypeTag::Unspecified);
    /// ```
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "String" | "str" | "char" => TypeTag::String,
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => TypeTag::Integer,
            "f32" | "f64" => TypeTag::Float,
            "bool" => TypeTag::Boolean,
            _ => TypeTag::Unspecified,
        }
    }

    /// The placeholder shown in usage lines, e.g. `[--count=<int>]`.
    ///
    /// `None` for [`TypeTag::Unspecified`].
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            TypeTag::String => Some("str"),
            TypeTag::Integer => Some("int"),
            TypeTag::Float => Some("float"),
            TypeTag::Boolean => Some("bool"),
            TypeTag::Unspecified => None,
        }
    }

    /// Converts a command-line literal into a value of this type.
    ///
    /// Returns `None` when the literal does not parse.
    pub fn coerce(self, literal: &str) -> Option<Value> {
        match self {
            TypeTag::String | TypeTag::Unspecified => Some(Value::Str(literal.to_string())),
            TypeTag::Integer => literal.parse::<i64>().ok().map(Value::Int),
            TypeTag::Float => literal
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Float),
            TypeTag::Boolean => parse_bool(literal).map(Value::Bool),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name().unwrap_or("text"))
    }
}

/// Boolean literals accepted on the command line, compared case-insensitively.
const TRUE_LITERALS: [&str; 3] = ["true", "1", "yes"];
const FALSE_LITERALS: [&str; 3] = ["false", "0", "no"];

fn parse_bool(literal: &str) -> Option<bool> {
    let lowered = literal.to_ascii_lowercase();
    if TRUE_LITERALS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_LITERALS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// A dynamically typed command value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Structured data, typically a command's return value.
    Json(serde_json::Value),
    /// No value: the default of an `Option<T>` parameter, or a unit return.
    #[default]
    None,
}

impl Value {
    /// Serializes any value into [`Value::Json`].
    pub fn json<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(data).map(Value::Json)
    }

    /// Returns `true` if this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The tag describing this value. `Json` and `None` are unspecified.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Str(_) => TypeTag::String,
            Value::Int(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Json(_) | Value::None => TypeTag::Unspecified,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts a float. Integers widen.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Json(v) => match serde_json::to_string_pretty(v) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
            Value::None => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

/// Non-finite floats become `null`, as `serde_json` does.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Str(s) => serde_json::Value::String(s),
            Value::Int(n) => n.into(),
            Value::Float(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Json(v) => v,
            Value::None => serde_json::Value::Null,
        }
    }
}

/// Named arguments handed to a command's callable, in binding order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any earlier binding.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        let name = name.into();
        match self.values.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.values.push((name, value));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Converts the named argument into `T`.
    ///
    /// An absent argument is treated as [`Value::None`], so `Option<T>`
    /// targets yield `None` and everything else fails.
    pub fn take<T: FromValue>(&self, name: &str) -> Result<T, DispatchError> {
        let value = self.get(name).unwrap_or(&Value::None);
        T::from_value(name, value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut args = Arguments::new();
        for (k, v) in iter {
            args.insert(k, v);
        }
        args
    }
}

/// Conversion from a bound [`Value`] into a Rust parameter type.
///
/// Implemented for the primitive types the dispatcher coerces to, for
/// `Option<T>`, and for `PathBuf`. Implement it for your own types to use them
/// as `#[command]` parameters; they are coerced as unspecified (string) values.
pub trait FromValue: Sized {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError>;
}

fn mismatch(name: &str, value: &Value, expected: TypeTag) -> DispatchError {
    DispatchError::TypeCoercion {
        command: String::new(),
        parameter: name.to_string(),
        literal: value.to_string(),
        expected,
    }
}

impl FromValue for Value {
    fn from_value(_name: &str, value: &Value) -> Result<Self, DispatchError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        match value {
            Value::None => Err(mismatch(name, value, TypeTag::String)),
            other => Ok(other.to_string()),
        }
    }
}

impl FromValue for PathBuf {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        value
            .as_str()
            .map(PathBuf::from)
            .ok_or_else(|| mismatch(name, value, TypeTag::Unspecified))
    }
}

impl FromValue for char {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        let s = value
            .as_str()
            .ok_or_else(|| mismatch(name, value, TypeTag::String))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(mismatch(name, value, TypeTag::String)),
        }
    }
}

impl FromValue for bool {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        value
            .as_bool()
            .ok_or_else(|| mismatch(name, value, TypeTag::Boolean))
    }
}

impl FromValue for f64 {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        value
            .as_float()
            .ok_or_else(|| mismatch(name, value, TypeTag::Float))
    }
}

impl FromValue for f32 {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        f64::from_value(name, value).map(|n| n as f32)
    }
}

macro_rules! from_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
                    value
                        .as_int()
                        .and_then(|n| <$ty>::try_from(n).ok())
                        .ok_or_else(|| mismatch(name, value, TypeTag::Integer))
                }
            }
        )*
    };
}

from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(name: &str, value: &Value) -> Result<Self, DispatchError> {
        match value {
            Value::None => Ok(None),
            other => T::from_value(name, other).map(Some),
        }
    }
}

/// Conversion from a command's return type into a [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::None
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl IntoValue for PathBuf {
    fn into_value(self) -> Value {
        Value::Str(self.display().to_string())
    }
}

impl IntoValue for serde_json::Value {
    fn into_value(self) -> Value {
        Value::Json(self)
    }
}

macro_rules! into_value_int {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(self as i64)
                }
            }
        )*
    };
}

into_value_int!(i8, i16, i32, i64, isize, u8, u16, u32);

/// Values above `i64::MAX` are kept exact as a JSON number.
impl IntoValue for u64 {
    fn into_value(self) -> Value {
        i64::try_from(self)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Json(self.into()))
    }
}

impl IntoValue for usize {
    fn into_value(self) -> Value {
        (self as u64).into_value()
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        self.map(IntoValue::into_value).unwrap_or(Value::None)
    }
}

/// Collects the elements into a JSON array. Use [`Value::json`] for
/// arbitrary `Serialize` data.
impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        let items = self
            .into_iter()
            .map(|item| serde_json::Value::from(item.into_value()))
            .collect();
        Value::Json(serde_json::Value::Array(items))
    }
}
