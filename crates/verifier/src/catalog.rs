// Scheme catalog contract
// The catalog itself lives outside this crate; the verifier only submits a
// text-coerced option map and consumes the structured outcome.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Per-category outcome of a catalog check.
///
/// Entry order inside each category is the catalog's own and is preserved
/// all the way into the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogOutcome {
    /// Option names the scheme does not declare.
    #[serde(default)]
    pub unknown: Vec<String>,
    /// Declared-required option names absent from the map.
    #[serde(default)]
    pub missing: Vec<String>,
    /// Boolean-typed options with unparseable values, name to offending text.
    #[serde(default)]
    pub invalid_boolean: Vec<(String, String)>,
    /// Integer-typed options with unparseable values.
    #[serde(default)]
    pub invalid_integer: Vec<(String, String)>,
    /// Number-typed options with unparseable values.
    #[serde(default)]
    pub invalid_number: Vec<(String, String)>,
    /// Enum-typed options set outside their allowed literals.
    #[serde(default)]
    pub invalid_enum: Vec<(String, String)>,
    /// Allowed literal sequences for enum-typed options.
    #[serde(default)]
    pub enum_choices: HashMap<String, Vec<String>>,
}

impl CatalogOutcome {
    /// True when no category holds an entry.
    pub fn is_success(&self) -> bool {
        self.unknown.is_empty()
            && self.missing.is_empty()
            && self.invalid_boolean.is_empty()
            && self.invalid_integer.is_empty()
            && self.invalid_number.is_empty()
            && self.invalid_enum.is_empty()
    }

    /// Allowed literals for an enum-typed option, empty when undeclared.
    pub fn choices_for(&self, name: &str) -> &[String] {
        self.enum_choices.get(name).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Declarative schema source describing valid option names, types and enum
/// choices per component scheme.
///
/// Must be deterministic for a given catalog version and input, and
/// thread-safe; the verifier never caches or retries.
pub trait SchemeCatalog: Send + Sync {
    /// Validate a text-coerced option map against the named scheme.
    fn validate(&self, scheme: &str, options: &BTreeMap<String, String>) -> CatalogOutcome;
}
