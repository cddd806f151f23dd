// Value conversion boundary
// The verifier reaches the runtime's conversion subsystem only through the
// narrow convert(target, value) contract below.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Shape a converter can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Text,
    Bool,
    Integer,
    Float,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Text => "text",
            TargetKind::Bool => "bool",
            TargetKind::Integer => "integer",
            TargetKind::Float => "float",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// No coercion exists from the given value to the target shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} to {target}")]
pub struct ConvertError {
    target: TargetKind,
    value: String,
}

impl ConvertError {
    pub fn new(target: TargetKind, value: &Value) -> Self {
        Self {
            target,
            value: value.to_string(),
        }
    }

    pub fn target(&self) -> TargetKind {
        self.target
    }

    /// JSON rendering of the rejected value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Converts raw option values to requested shapes.
///
/// Implementations must be thread-safe; the verifier shares one converter
/// across concurrent calls.
pub trait ValueConverter: Send + Sync {
    /// String form of a value, as handed to the scheme catalog.
    fn as_text(&self, value: &Value) -> Result<String, ConvertError>;

    /// Coerce a raw value into the requested shape.
    fn convert(&self, target: TargetKind, value: &Value) -> Result<Value, ConvertError>;
}

/// Converter over JSON scalars: strings pass through, numbers and booleans
/// convert both ways. Nulls, arrays and objects never coerce.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicConverter;

impl ValueConverter for BasicConverter {
    fn as_text(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Bool(flag) => Ok(flag.to_string()),
            Value::Number(number) => Ok(number.to_string()),
            _ => Err(ConvertError::new(TargetKind::Text, value)),
        }
    }

    fn convert(&self, target: TargetKind, value: &Value) -> Result<Value, ConvertError> {
        let fail = || ConvertError::new(target, value);
        match target {
            TargetKind::Text => self.as_text(value).map(Value::String),
            TargetKind::Bool => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(text) => match text.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(fail()),
                },
                _ => Err(fail()),
            },
            TargetKind::Integer => match value {
                Value::Number(number) if number.is_i64() || number.is_u64() => Ok(value.clone()),
                Value::String(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| fail()),
                _ => Err(fail()),
            },
            TargetKind::Float => match value {
                Value::Number(_) => Ok(value.clone()),
                Value::String(text) => text
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(fail),
                _ => Err(fail()),
            },
        }
    }
}

/// Typed view over an option value; drives converter-backed extraction.
pub trait OptionValue: Sized {
    /// Shape the converter is asked for before the typed read.
    const TARGET: TargetKind;

    /// Read the typed value out of a converter-shaped JSON value.
    fn from_converted(value: &Value) -> Option<Self>;
}

impl OptionValue for String {
    const TARGET: TargetKind = TargetKind::Text;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl OptionValue for bool {
    const TARGET: TargetKind = TargetKind::Bool;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl OptionValue for i64 {
    const TARGET: TargetKind = TargetKind::Integer;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl OptionValue for u64 {
    const TARGET: TargetKind = TargetKind::Integer;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl OptionValue for u32 {
    const TARGET: TargetKind = TargetKind::Integer;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| u32::try_from(n).ok())
    }
}

impl OptionValue for u16 {
    const TARGET: TargetKind = TargetKind::Integer;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| u16::try_from(n).ok())
    }
}

impl OptionValue for f64 {
    const TARGET: TargetKind = TargetKind::Float;

    fn from_converted(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}
