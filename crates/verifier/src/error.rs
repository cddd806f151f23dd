// Classified configuration defects and their builder.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Detail key carrying the offending value of an illegal option.
pub const DETAIL_VALUE: &str = "value";

/// Detail key carrying the allowed literals of an enum-typed option.
pub const DETAIL_ENUM_VALUES: &str = "enum.values";

/// Classification code for a configuration defect.
///
/// The standard codes are closed; connectivity probes extend the taxonomy
/// through [`Code::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Code {
    /// Environment or dependency misconfiguration; fatal to the call.
    Internal,
    /// Option name not recognized by the catalog for the resolved scheme.
    UnknownOption,
    /// Required option absent from the configuration map.
    MissingOption,
    /// Option present but failing type or shape validation.
    IllegalOption,
    /// Mandatory option requested by a probe but absent from the map.
    NoSuchOption,
    /// Verifier-specific extension, e.g. connectivity probe codes.
    Other(String),
}

impl Code {
    /// Extension code for probe-specific failures.
    pub fn other(code: impl Into<String>) -> Self {
        Code::Other(code.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Code::Internal => "INTERNAL",
            Code::UnknownOption => "UNKNOWN_OPTION",
            Code::MissingOption => "MISSING_OPTION",
            Code::IllegalOption => "ILLEGAL_OPTION",
            Code::NoSuchOption => "NO_SUCH_OPTION",
            Code::Other(code) => code,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Code> for String {
    fn from(code: Code) -> Self {
        code.as_str().to_string()
    }
}

impl From<String> for Code {
    fn from(code: String) -> Self {
        match code.as_str() {
            "INTERNAL" => Code::Internal,
            "UNKNOWN_OPTION" => Code::UnknownOption,
            "MISSING_OPTION" => Code::MissingOption,
            "ILLEGAL_OPTION" => Code::IllegalOption,
            "NO_SUCH_OPTION" => Code::NoSuchOption,
            _ => Code::Other(code),
        }
    }
}

/// One classified configuration defect.
///
/// `parameter_keys` names the implicated options and may be empty for
/// internal errors; `details` carries structured extras such as the
/// offending value or an enum's allowed literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationError {
    code: Code,
    #[serde(default)]
    parameter_keys: BTreeSet<String>,
    description: String,
    #[serde(default)]
    details: BTreeMap<String, Value>,
}

impl VerificationError {
    pub fn builder(code: Code) -> ErrorBuilder {
        ErrorBuilder::new(code)
    }

    /// Failure of the environment rather than of the configuration.
    pub fn internal(description: impl Into<String>) -> Self {
        ErrorBuilder::new(Code::Internal)
            .description(description)
            .build()
    }

    /// Option name the catalog does not declare for the scheme.
    pub fn unknown_option(name: impl Into<String>) -> Self {
        let name = name.into();
        ErrorBuilder::new(Code::UnknownOption)
            .description(format!("{name} is not a known option"))
            .parameter_key(name)
            .build()
    }

    /// Required option absent from the configuration map.
    pub fn missing_option(name: impl Into<String>) -> Self {
        let name = name.into();
        ErrorBuilder::new(Code::MissingOption)
            .description(format!("{name} must be set"))
            .parameter_key(name)
            .build()
    }

    /// Present option whose value fails type validation.
    pub fn illegal_option(name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        ErrorBuilder::new(Code::IllegalOption)
            .description(format!("illegal value for {name}"))
            .detail(DETAIL_VALUE, Value::String(value.into()))
            .parameter_key(name)
            .build()
    }

    /// Enum-typed option set outside its allowed literals.
    pub fn illegal_enum_option(
        name: impl Into<String>,
        value: impl Into<String>,
        choices: &[String],
    ) -> Self {
        let name = name.into();
        ErrorBuilder::new(Code::IllegalOption)
            .description(format!("illegal value for {name}"))
            .detail(DETAIL_VALUE, Value::String(value.into()))
            .detail(DETAIL_ENUM_VALUES, Value::from(choices.to_vec()))
            .parameter_key(name)
            .build()
    }

    /// Mandatory option found absent at extraction time.
    pub fn no_such_option(name: impl Into<String>) -> Self {
        let name = name.into();
        ErrorBuilder::new(Code::NoSuchOption)
            .description(format!("no such option: {name}"))
            .parameter_key(name)
            .build()
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn parameter_keys(&self) -> &BTreeSet<String> {
        &self.parameter_keys
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn details(&self) -> &BTreeMap<String, Value> {
        &self.details
    }

    /// One detail value by key.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)?;
        if !self.parameter_keys.is_empty() {
            let keys: Vec<&str> = self.parameter_keys.iter().map(String::as_str).collect();
            write!(f, " [{}]", keys.join(", "))?;
        }
        Ok(())
    }
}

/// Builds a [`VerificationError`] field by field.
#[derive(Debug)]
pub struct ErrorBuilder {
    code: Code,
    parameter_keys: BTreeSet<String>,
    description: String,
    details: BTreeMap<String, Value>,
}

impl ErrorBuilder {
    pub fn new(code: Code) -> Self {
        Self {
            code,
            parameter_keys: BTreeSet::new(),
            description: String::new(),
            details: BTreeMap::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Implicate an option name.
    pub fn parameter_key(mut self, key: impl Into<String>) -> Self {
        self.parameter_keys.insert(key.into());
        self
    }

    /// Attach a structured detail.
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> VerificationError {
        VerificationError {
            code: self.code,
            parameter_keys: self.parameter_keys,
            description: self.description,
            details: self.details,
        }
    }
}
