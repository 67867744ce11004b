//! `maintenance_info` blocks
//!
//! Checked globally (`service_catalog.maintenance_info`) and per plan.
//! `public` and `private` must be flat maps; `version` must be semver.

use crate::config::tree::{lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::plans;
use serde_json::Value;

/// Validate the global and every plan's `maintenance_info`
///
/// # Errors
///
/// Returns an error if `public`/`private` is not a map or holds a nested map,
/// or `version` is not a semantic version.
#[inline]
pub fn maintenance_info(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;

    let global = tree.get("service_catalog.maintenance_info");
    let per_plan = plans(tree).map(|plan| lookup(plan, "maintenance_info"));

    for info in core::iter::once(global).chain(per_plan).flatten() {
        check_maintenance_info(info)?;
    }
    Ok(())
}

/// Validate a single `maintenance_info` block
///
/// # Errors
///
/// Same as [`maintenance_info`].
#[inline]
pub fn check_maintenance_info(info: &Value) -> Result<(), ValidationError> {
    for key in ["public", "private"] {
        match lookup(info, key) {
            None | Some(&Value::Null) => {}
            Some(&Value::Object(ref entries)) => {
                if entries.values().any(Value::is_object) {
                    return Err(ValidationError::invalid_shape(format!(
                        "the values for maintenance_info.{key} cannot be nested"
                    )));
                }
            }
            Some(_) => {
                return Err(ValidationError::invalid_shape(format!(
                    "maintenance_info.{key} must be a map"
                )));
            }
        }
    }

    if let Some(version) = lookup(info, "version").filter(|v| !v.is_null()) {
        let valid = scalar_to_string(version)
            .is_some_and(|version| semver::Version::parse(&version).is_ok());
        if !valid {
            return Err(ValidationError::invalid_version(
                "maintenance_info.version must respect semver",
            ));
        }
    }

    Ok(())
}
