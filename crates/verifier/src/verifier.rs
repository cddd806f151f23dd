// Verifier orchestration
// Scope dispatch, catalog-outcome translation, and the connectivity hook.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::CatalogOutcome;
use crate::context::ComponentContext;
use crate::error::{Code, VerificationError};
use crate::report::{Report, ReportBuilder, Scope, Status};
use crate::ParamMap;

/// Option key overriding the verifier's default scheme for one call.
pub const SCHEME_OPTION: &str = "scheme";

/// Code attached when a connectivity probe fails instead of reporting.
const EXCEPTION_CODE: &str = "EXCEPTION";

/// Live-probe extension point for concrete component verifiers.
///
/// Implementations pull typed options through the context, attempt the real
/// probe (network call, handshake, authentication) and report `Ok`/`Error`
/// themselves, extending the code taxonomy as needed. A returned `Err` is
/// wrapped into an error report under the `EXCEPTION` code.
pub trait ConnectivityProbe: Send + Sync {
    fn probe(&self, context: &ComponentContext, params: &ParamMap) -> anyhow::Result<Report>;
}

/// Verifies a component's configuration before it is instantiated or
/// connected.
///
/// Holds only its default scheme and injected dependencies; it keeps no
/// per-call state and can be shared across threads and reused freely.
pub struct Verifier {
    default_scheme: String,
    context: Option<Arc<ComponentContext>>,
    probe: Option<Box<dyn ConnectivityProbe>>,
}

impl Verifier {
    /// Verifier for the given component scheme, with no dependencies bound
    /// yet. Until a context is attached every call reports an internal
    /// error.
    pub fn new(default_scheme: impl Into<String>) -> Self {
        Self {
            default_scheme: default_scheme.into(),
            context: None,
            probe: None,
        }
    }

    /// Bind the runtime dependencies.
    pub fn with_context(mut self, context: Arc<ComponentContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Install a live connectivity probe.
    pub fn with_probe(mut self, probe: impl ConnectivityProbe + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    pub fn default_scheme(&self) -> &str {
        &self.default_scheme
    }

    /// Bound runtime dependencies, when present.
    pub fn context(&self) -> Option<&ComponentContext> {
        self.context.as_deref()
    }

    /// Run one verification pass over the configuration map.
    ///
    /// Domain defects never surface as panics or `Err`; they are collected
    /// in the returned report.
    pub fn verify(&self, scope: Scope, params: &ParamMap) -> Report {
        let Some(context) = &self.context else {
            warn!(
                "verify called on {} without a component context",
                self.default_scheme
            );
            return Report::builder(Status::Error, scope)
                .error(VerificationError::internal("missing component context"))
                .build();
        };

        match scope {
            Scope::Parameters => self.verify_parameters(context, params),
            Scope::Connectivity => self.verify_connectivity(context, params),
        }
    }

    fn verify_parameters(&self, context: &ComponentContext, params: &ParamMap) -> Report {
        let mut builder = Report::builder(Status::Ok, Scope::Parameters);

        // Per-call scheme override, string-formed like every other option.
        let scheme = match params.get(SCHEME_OPTION) {
            Some(raw) => match context.converter().as_text(raw) {
                Ok(text) => text,
                Err(error) => {
                    return builder
                        .error(VerificationError::internal(format!("scheme option: {error}")))
                        .build();
                }
            },
            None => self.default_scheme.clone(),
        };
        debug!("validating parameters against catalog scheme {scheme}");

        // The catalog checks text forms; coerce the whole map up front.
        // Unconvertible values surface as internal errors and the catalog
        // is never consulted with a partial map.
        let mut options = BTreeMap::new();
        let mut unconvertible = Vec::new();
        for (key, value) in params {
            match context.converter().as_text(value) {
                Ok(text) => {
                    options.insert(key.clone(), text);
                }
                Err(error) => unconvertible.push((key.clone(), error)),
            }
        }
        if !unconvertible.is_empty() {
            unconvertible.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, error) in unconvertible {
                builder = builder.error(VerificationError::internal(format!("{key}: {error}")));
            }
            return builder.build();
        }

        let outcome = context.catalog().validate(&scheme, &options);
        translate_outcome(builder, &outcome).build()
    }

    fn verify_connectivity(&self, context: &ComponentContext, params: &ParamMap) -> Report {
        let Some(probe) = &self.probe else {
            return Report::builder(Status::Unsupported, Scope::Connectivity).build();
        };

        match probe.probe(context, params) {
            Ok(report) => report,
            Err(error) => {
                warn!(
                    "connectivity probe for {} failed: {error:#}",
                    self.default_scheme
                );
                Report::builder(Status::Error, Scope::Connectivity)
                    .error(
                        VerificationError::builder(Code::other(EXCEPTION_CODE))
                            .description(format!("{error:#}"))
                            .build(),
                    )
                    .build()
            }
        }
    }
}

// Category order is a visible contract: unknown, missing, then the invalid
// boolean/integer/number/enum groups, each preserving catalog order.
fn translate_outcome(mut builder: ReportBuilder, outcome: &CatalogOutcome) -> ReportBuilder {
    if outcome.is_success() {
        return builder;
    }
    for name in &outcome.unknown {
        builder = builder.error(VerificationError::unknown_option(name));
    }
    for name in &outcome.missing {
        builder = builder.error(VerificationError::missing_option(name));
    }
    for (name, value) in &outcome.invalid_boolean {
        builder = builder.error(VerificationError::illegal_option(name, value));
    }
    for (name, value) in &outcome.invalid_integer {
        builder = builder.error(VerificationError::illegal_option(name, value));
    }
    for (name, value) in &outcome.invalid_number {
        builder = builder.error(VerificationError::illegal_option(name, value));
    }
    for (name, value) in &outcome.invalid_enum {
        builder = builder.error(VerificationError::illegal_enum_option(
            name,
            value,
            outcome.choices_for(name),
        ));
    }
    builder
}
