//! Catalog-driven verification of component configuration before a
//! component is instantiated or connected, split over two scopes: static
//! parameter validation and live connectivity probing.
//!
//! Concrete components plug in through [`ConnectivityProbe`] and pull typed
//! or registry-resolved values back out through [`ComponentContext`].

use serde_json::Value;
use std::collections::HashMap;

// Verification models
pub mod error;
pub mod report;

// External collaborator contracts
pub mod catalog;
pub mod convert;
pub mod registry;

// Extraction, binding, and orchestration
pub mod bind;
pub mod context;
pub mod verifier;

pub use bind::{is_reference, Assign, BindError, Bound, FieldMap, ParamValue, REFERENCE_MARKER};
pub use catalog::{CatalogOutcome, SchemeCatalog};
pub use context::{ComponentContext, OptionError};
pub use convert::{BasicConverter, ConvertError, OptionValue, TargetKind, ValueConverter};
pub use error::{
    Code, ErrorBuilder, VerificationError, DETAIL_ENUM_VALUES, DETAIL_VALUE,
};
pub use registry::{MapRegistry, Registry};
pub use report::{Report, ReportBuilder, Scope, Status};
pub use verifier::{ConnectivityProbe, Verifier, SCHEME_OPTION};

/// Raw configuration map: option name to raw value, order irrelevant. Read
/// only from the verifier's perspective.
pub type ParamMap = HashMap<String, Value>;
