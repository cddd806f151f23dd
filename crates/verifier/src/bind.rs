// Property binding onto typed component structures.
// Raw values are literal-or-reference; references defer to the registry
// instead of being coerced as literals.

use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::context::ComponentContext;
use crate::convert::{ConvertError, TargetKind};
use crate::ParamMap;

/// Marker prefix naming a registry object inside a configuration value.
pub const REFERENCE_MARKER: char = '#';

/// True when a raw string names a registry object instead of a literal.
pub fn is_reference(text: &str) -> bool {
    text.len() > 1 && text.starts_with(REFERENCE_MARKER)
}

/// A raw configuration value, classified: a literal to coerce, or the name
/// of a registry object to resolve at bind time.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Literal(Value),
    Reference(String),
}

impl ParamValue {
    /// Classify a raw value. Only strings can carry the reference marker.
    pub fn classify(value: &Value) -> ParamValue {
        match value.as_str() {
            Some(text) if is_reference(text) => ParamValue::Reference(text[1..].to_string()),
            _ => ParamValue::Literal(value.clone()),
        }
    }
}

/// Binding failure.
#[derive(Debug, Error)]
pub enum BindError {
    /// A `#name` value with no object bound under that name.
    #[error("reference #{0} is not bound in the registry")]
    UnboundReference(String),
    /// A resolved or converted value that does not fit the field.
    #[error("value does not fit field {0}")]
    Mismatch(String),
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// What an assignment function receives: a converter-shaped literal, or the
/// registry object behind a reference value.
pub enum Bound {
    Value(Value),
    Object(Arc<dyn Any + Send + Sync>),
}

impl Bound {
    pub fn text(self, field: &str) -> Result<String, BindError> {
        match self {
            Bound::Value(Value::String(text)) => Ok(text),
            _ => Err(BindError::Mismatch(field.to_string())),
        }
    }

    pub fn boolean(self, field: &str) -> Result<bool, BindError> {
        match self {
            Bound::Value(value) => value.as_bool().ok_or_else(|| BindError::Mismatch(field.to_string())),
            Bound::Object(_) => Err(BindError::Mismatch(field.to_string())),
        }
    }

    pub fn integer(self, field: &str) -> Result<i64, BindError> {
        match self {
            Bound::Value(value) => value.as_i64().ok_or_else(|| BindError::Mismatch(field.to_string())),
            Bound::Object(_) => Err(BindError::Mismatch(field.to_string())),
        }
    }

    pub fn float(self, field: &str) -> Result<f64, BindError> {
        match self {
            Bound::Value(value) => value.as_f64().ok_or_else(|| BindError::Mismatch(field.to_string())),
            Bound::Object(_) => Err(BindError::Mismatch(field.to_string())),
        }
    }

    /// Registry object, downcast to the concrete type the field holds.
    pub fn object<U: Any + Send + Sync>(self, field: &str) -> Result<Arc<U>, BindError> {
        match self {
            Bound::Object(object) => object
                .downcast::<U>()
                .map_err(|_| BindError::Mismatch(field.to_string())),
            Bound::Value(_) => Err(BindError::Mismatch(field.to_string())),
        }
    }
}

/// Assignment function for one declared field.
pub type Assign<T> = fn(&mut T, Bound) -> Result<(), BindError>;

struct FieldSpec<T> {
    target: TargetKind,
    assign: Assign<T>,
}

/// Declared field table for a consuming type: which map keys bind, what
/// shape their literals take, and how they assign. Built once per type; the
/// explicit table replaces name-based runtime introspection.
pub struct FieldMap<T> {
    fields: HashMap<&'static str, FieldSpec<T>>,
}

impl<T> FieldMap<T> {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Declare a bindable field.
    pub fn field(mut self, name: &'static str, target: TargetKind, assign: Assign<T>) -> Self {
        self.fields.insert(name, FieldSpec { target, assign });
        self
    }

    /// Declared field names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.keys().copied()
    }

    fn get(&self, name: &str) -> Option<&FieldSpec<T>> {
        self.fields.get(name)
    }
}

impl<T> Default for FieldMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentContext {
    /// Assign matching map entries onto `instance` through its declared
    /// field table; keys without a declared field are skipped.
    ///
    /// Literal values are converted to the field's declared shape and
    /// assigned first; reference values are recorded and resolved through
    /// the registry in a second pass, so a `#name` is never coerced as text.
    pub fn bind<T>(
        &self,
        instance: &mut T,
        fields: &FieldMap<T>,
        params: &ParamMap,
    ) -> Result<(), BindError> {
        let mut deferred: Vec<(&FieldSpec<T>, String)> = Vec::new();
        for (key, raw) in params {
            let Some(spec) = fields.get(key) else {
                continue;
            };
            match ParamValue::classify(raw) {
                ParamValue::Literal(value) => {
                    let shaped = self.converter().convert(spec.target, &value)?;
                    (spec.assign)(instance, Bound::Value(shaped))?;
                }
                ParamValue::Reference(name) => {
                    debug!("deferring {key} to registry reference #{name}");
                    deferred.push((spec, name));
                }
            }
        }
        for (spec, name) in deferred {
            let object = self
                .registry()
                .resolve(&name)
                .ok_or_else(|| BindError::UnboundReference(name.clone()))?;
            (spec.assign)(instance, Bound::Object(object))?;
        }
        Ok(())
    }

    /// Prefix-filtering variant of [`ComponentContext::bind`]: only entries
    /// whose keys start with `prefix` take part, matched with the prefix
    /// stripped.
    pub fn bind_prefixed<T>(
        &self,
        instance: &mut T,
        fields: &FieldMap<T>,
        prefix: &str,
        params: &ParamMap,
    ) -> Result<(), BindError> {
        let filtered: ParamMap = params
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();
        self.bind(instance, fields, &filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogOutcome, SchemeCatalog};
    use crate::convert::BasicConverter;
    use crate::registry::MapRegistry;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct NullCatalog;

    impl SchemeCatalog for NullCatalog {
        fn validate(&self, _scheme: &str, _options: &BTreeMap<String, String>) -> CatalogOutcome {
            CatalogOutcome::default()
        }
    }

    #[derive(Debug, PartialEq)]
    struct ConnectionPool {
        size: usize,
    }

    #[derive(Default)]
    struct Endpoint {
        host: String,
        port: i64,
        secure: bool,
        pool: Option<Arc<ConnectionPool>>,
    }

    fn endpoint_fields() -> FieldMap<Endpoint> {
        FieldMap::new()
            .field("host", TargetKind::Text, |e, b| {
                e.host = b.text("host")?;
                Ok(())
            })
            .field("port", TargetKind::Integer, |e, b| {
                e.port = b.integer("port")?;
                Ok(())
            })
            .field("secure", TargetKind::Bool, |e, b| {
                e.secure = b.boolean("secure")?;
                Ok(())
            })
            .field("pool", TargetKind::Text, |e, b| {
                e.pool = Some(b.object::<ConnectionPool>("pool")?);
                Ok(())
            })
    }

    fn context(registry: MapRegistry) -> ComponentContext {
        ComponentContext::new(
            Arc::new(NullCatalog),
            Arc::new(BasicConverter),
            Arc::new(registry),
        )
    }

    fn params(entries: &[(&str, Value)]) -> ParamMap {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_classify_splits_literals_and_references() {
        assert_eq!(
            ParamValue::classify(&json!("#pool")),
            ParamValue::Reference("pool".to_string())
        );
        assert_eq!(
            ParamValue::classify(&json!("plain")),
            ParamValue::Literal(json!("plain"))
        );
        // A bare marker is not a name.
        assert_eq!(
            ParamValue::classify(&json!("#")),
            ParamValue::Literal(json!("#"))
        );
        assert_eq!(
            ParamValue::classify(&json!(5672)),
            ParamValue::Literal(json!(5672))
        );
    }

    #[test]
    fn test_literals_bind_with_coercion() {
        let context = context(MapRegistry::new());
        let mut endpoint = Endpoint::default();

        context
            .bind(
                &mut endpoint,
                &endpoint_fields(),
                &params(&[
                    ("host", json!("broker.local")),
                    ("port", json!("5672")),
                    ("secure", json!("true")),
                    ("ignored", json!("skipped")),
                ]),
            )
            .expect("binding succeeds");

        assert_eq!(endpoint.host, "broker.local");
        assert_eq!(endpoint.port, 5672);
        assert!(endpoint.secure);
        assert!(endpoint.pool.is_none());
    }

    #[test]
    fn test_references_resolve_through_the_registry() {
        let registry = MapRegistry::new().with("shared-pool", Arc::new(ConnectionPool { size: 8 }));
        let context = context(registry);
        let mut endpoint = Endpoint::default();

        context
            .bind(
                &mut endpoint,
                &endpoint_fields(),
                &params(&[("host", json!("broker.local")), ("pool", json!("#shared-pool"))]),
            )
            .expect("binding succeeds");

        let pool = endpoint.pool.expect("pool resolved");
        assert_eq!(pool.size, 8);
    }

    #[test]
    fn test_unbound_reference_fails_binding() {
        let context = context(MapRegistry::new());
        let mut endpoint = Endpoint::default();

        let error = context
            .bind(
                &mut endpoint,
                &endpoint_fields(),
                &params(&[("pool", json!("#missing-pool"))]),
            )
            .unwrap_err();

        assert!(matches!(error, BindError::UnboundReference(ref name) if name == "missing-pool"));
    }

    #[test]
    fn test_unconvertible_literal_fails_binding() {
        let context = context(MapRegistry::new());
        let mut endpoint = Endpoint::default();

        let error = context
            .bind(
                &mut endpoint,
                &endpoint_fields(),
                &params(&[("port", json!("not-a-number"))]),
            )
            .unwrap_err();

        assert!(matches!(error, BindError::Convert(_)));
    }

    #[test]
    fn test_prefix_binding_strips_the_prefix() {
        let context = context(MapRegistry::new());
        let mut endpoint = Endpoint::default();

        context
            .bind_prefixed(
                &mut endpoint,
                &endpoint_fields(),
                "endpoint.",
                &params(&[
                    ("endpoint.host", json!("broker.local")),
                    ("endpoint.port", json!(5672)),
                    ("other.host", json!("elsewhere")),
                ]),
            )
            .expect("binding succeeds");

        assert_eq!(endpoint.host, "broker.local");
        assert_eq!(endpoint.port, 5672);
    }
}
