// Injected runtime dependencies and typed option extraction.

use std::sync::Arc;
use thiserror::Error;

use crate::catalog::SchemeCatalog;
use crate::convert::{ConvertError, OptionValue, ValueConverter};
use crate::error::VerificationError;
use crate::registry::Registry;
use crate::ParamMap;

/// Extraction failure surfaced to probe implementations.
#[derive(Debug, Error)]
pub enum OptionError {
    /// Mandatory option absent from the map.
    #[error("no such option: {0}")]
    NoSuchOption(String),
    /// Present option the converter cannot shape.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

impl From<OptionError> for VerificationError {
    fn from(error: OptionError) -> Self {
        match error {
            OptionError::NoSuchOption(name) => VerificationError::no_such_option(name),
            OptionError::Convert(inner) => VerificationError::internal(inner.to_string()),
        }
    }
}

/// The runtime dependencies a verifier works against: scheme catalog, value
/// converter and named-object registry, injected once at construction.
///
/// One context is shared by every verifier of a runtime; all three members
/// must be thread-safe.
pub struct ComponentContext {
    catalog: Arc<dyn SchemeCatalog>,
    converter: Arc<dyn ValueConverter>,
    registry: Arc<dyn Registry>,
}

impl ComponentContext {
    pub fn new(
        catalog: Arc<dyn SchemeCatalog>,
        converter: Arc<dyn ValueConverter>,
        registry: Arc<dyn Registry>,
    ) -> Self {
        Self {
            catalog,
            converter,
            registry,
        }
    }

    pub fn catalog(&self) -> &dyn SchemeCatalog {
        self.catalog.as_ref()
    }

    pub fn converter(&self) -> &dyn ValueConverter {
        self.converter.as_ref()
    }

    pub fn registry(&self) -> &dyn Registry {
        self.registry.as_ref()
    }

    /// Typed read of an option; absence is legitimate and yields `None`.
    pub fn option<T: OptionValue>(
        &self,
        params: &ParamMap,
        key: &str,
    ) -> Result<Option<T>, OptionError> {
        let Some(raw) = params.get(key) else {
            return Ok(None);
        };
        let converted = self.converter.convert(T::TARGET, raw)?;
        let typed = T::from_converted(&converted).ok_or_else(|| ConvertError::new(T::TARGET, raw))?;
        Ok(Some(typed))
    }

    /// Typed read with a lazily supplied fallback for absent keys.
    pub fn option_or_else<T: OptionValue>(
        &self,
        params: &ParamMap,
        key: &str,
        default: impl FnOnce() -> T,
    ) -> Result<T, OptionError> {
        Ok(self.option(params, key)?.unwrap_or_else(default))
    }

    /// Typed read that makes absence a hard error; the one extraction path
    /// where a missing key aborts the caller.
    pub fn mandatory_option<T: OptionValue>(
        &self,
        params: &ParamMap,
        key: &str,
    ) -> Result<T, OptionError> {
        self.option(params, key)?
            .ok_or_else(|| OptionError::NoSuchOption(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogOutcome;
    use crate::convert::BasicConverter;
    use crate::error::Code;
    use crate::registry::MapRegistry;
    use serde_json::json;
    use std::collections::BTreeMap;

    struct NullCatalog;

    impl SchemeCatalog for NullCatalog {
        fn validate(&self, _scheme: &str, _options: &BTreeMap<String, String>) -> CatalogOutcome {
            CatalogOutcome::default()
        }
    }

    fn context() -> ComponentContext {
        ComponentContext::new(
            Arc::new(NullCatalog),
            Arc::new(BasicConverter),
            Arc::new(MapRegistry::new()),
        )
    }

    fn params() -> ParamMap {
        [
            ("host".to_string(), json!("broker.local")),
            ("port".to_string(), json!("5672")),
            ("secure".to_string(), json!(true)),
            ("labels".to_string(), json!(["a", "b"])),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_present_options_read_typed() {
        let context = context();
        let params = params();

        let host: Option<String> = context.option(&params, "host").expect("convertible");
        let port: Option<u16> = context.option(&params, "port").expect("convertible");
        let secure: Option<bool> = context.option(&params, "secure").expect("convertible");

        assert_eq!(host.as_deref(), Some("broker.local"));
        assert_eq!(port, Some(5672));
        assert_eq!(secure, Some(true));
    }

    #[test]
    fn test_absent_option_is_none_not_an_error() {
        let context = context();
        let value: Option<String> = context.option(&params(), "missing").expect("absence is ok");
        assert!(value.is_none());
    }

    #[test]
    fn test_default_supplier_fills_absent_keys() {
        let context = context();
        let port: u16 = context
            .option_or_else(&params(), "admin-port", || 15672)
            .expect("default applies");
        assert_eq!(port, 15672);
    }

    #[test]
    fn test_mandatory_option_fails_on_absence() {
        let context = context();
        let error = context
            .mandatory_option::<String>(&params(), "missing")
            .unwrap_err();

        assert!(matches!(error, OptionError::NoSuchOption(ref key) if key == "missing"));

        let verification: VerificationError = error.into();
        assert_eq!(*verification.code(), Code::NoSuchOption);
        assert!(verification.parameter_keys().contains("missing"));
    }

    #[test]
    fn test_unconvertible_option_propagates_converter_failure() {
        let context = context();
        let error = context.option::<u16>(&params(), "labels").unwrap_err();

        assert!(matches!(error, OptionError::Convert(_)));

        let verification: VerificationError = error.into();
        assert_eq!(*verification.code(), Code::Internal);
    }
}
