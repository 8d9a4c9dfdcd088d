//! The rule capability contract.
//!
//! Everything that transforms a [`Program`] — main rules resolved from a rule
//! set and the post passes of the pipeline — implements [`Rule`]. The
//! pipeline and the processor only ever see `dyn Rule`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::ast::Program;
use crate::context::FileContext;
use crate::error::{ConfigureError, PassError};

/// Configuration parameters attached to a rule reference (name → value).
pub type Params = Map<String, Value>;

/// A unit of transformation logic.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Stable identifier, used for registry lookup and skip configuration.
    fn id(&self) -> &'static str;

    /// Cheap pre-check: `false` means this rule cannot affect the tree and
    /// the (potentially expensive) walk is skipped.
    fn should_traverse(&self, _program: &Program, _ctx: &FileContext) -> bool {
        true
    }

    /// Transform the program. The returned tree is the input of the next rule.
    fn apply(&self, program: Program, ctx: &mut FileContext) -> Result<Program, PassError>;

    /// The configuration capability, for rules that accept parameters.
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

/// Capability of accepting configuration parameters from a rule-set entry.
pub trait Configurable {
    fn configure(&mut self, params: &Params) -> Result<(), ConfigureError>;
}

// ---------------------------------------------------------------------------
// Parameter helpers
// ---------------------------------------------------------------------------

/// Read every parameter as a `string → string` mapping.
///
/// Used by the renaming rules whose configuration is `{"Old": "New", ...}`.
pub fn string_map(params: &Params) -> Result<BTreeMap<String, String>, ConfigureError> {
    params
        .iter()
        .map(|(key, value)| match value.as_str() {
            Some(target) => Ok((
                key.trim_start_matches('\\').to_string(),
                target.trim_start_matches('\\').to_string(),
            )),
            None => Err(ConfigureError::new(format!(
                "value for {:?} must be a string, found {}",
                key, value
            ))),
        })
        .collect()
}

/// Read a required `key: [string, ...]` parameter.
pub fn string_list(params: &Params, key: &str) -> Result<Vec<String>, ConfigureError> {
    let value = params
        .get(key)
        .ok_or_else(|| ConfigureError::new(format!("missing parameter {:?}", key)))?;
    let items = value
        .as_array()
        .ok_or_else(|| ConfigureError::new(format!("parameter {:?} must be an array", key)))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ConfigureError::new(format!("parameter {:?} must contain strings", key))
            })
        })
        .collect()
}
