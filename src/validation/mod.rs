//! Validators
//!
//! An ordered list of independent rule-checkers, each owning one
//! configuration section. They run against the canonicalized properties and
//! stop at the first violation: there is no aggregation across sections.

pub mod auth;
pub mod backup;
pub mod catalog;
pub mod credhub;
pub mod deployment;
pub mod dns;
pub mod errands;
pub mod maintenance;
pub mod quotas;
pub mod upgrades;

use crate::config::tree::{PropertyTree, is_blank, lookup};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::Value;
use tracing::trace;

/// A single section check
pub type Validator = fn(&RenderContext) -> Result<(), ValidationError>;

/// Allowed values of a plan's `cf_service_access`
pub const SERVICE_ACCESS_VALUES: [&str; 4] = ["enable", "disable", "manual", "org-restricted"];

/// Run `validators` in order, failing on the first violation
///
/// # Errors
///
/// Returns the first [`ValidationError`] raised.
#[inline]
pub fn validate(validators: &[Validator], context: &RenderContext) -> Result<(), ValidationError> {
    for (index, validator) in validators.iter().enumerate() {
        trace!("Running validator {}/{}", index + 1, validators.len());
        validator(context)?;
    }
    Ok(())
}

/// Absent, nil, the empty string or an empty sequence
#[must_use]
#[inline]
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        Some(&Value::Array(ref items)) => items.is_empty(),
        other => is_blank(other),
    }
}

/// Fail with `Invalid <section> config - must specify <field>` for the first missing field
pub(crate) fn require_fields(
    value: &Value,
    section: &str,
    fields: &[&str],
) -> Result<(), ValidationError> {
    match fields
        .iter()
        .find(|field| is_missing(lookup(value, field)))
    {
        Some(field) => Err(ValidationError::missing_field(section, field)),
        None => Ok(()),
    }
}

/// Plans of a broker property tree, nil entries already filtered
pub(crate) fn plans(tree: &PropertyTree) -> impl Iterator<Item = &Value> {
    tree.get("service_catalog.plans")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Display name of a plan for error messages
pub(crate) fn plan_name(plan: &Value) -> &str {
    lookup(plan, "name").and_then(Value::as_str).unwrap_or_default()
}
