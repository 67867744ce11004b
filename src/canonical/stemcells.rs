//! Singular `stemcell` migration
//!
//! `service_deployment.stemcell` is wrapped into a one-element
//! `service_deployment.stemcells` sequence. Supplying both is ambiguous and
//! rejected.

use crate::config::tree::{PropertyTree, has_content};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::Value;

/// Wrap a singular stemcell into the stemcells sequence
///
/// # Errors
///
/// Returns [`ValidationError::ConflictingConfig`] when both `stemcell` and a
/// non-empty `stemcells` are configured.
#[inline]
pub fn stemcells(context: &mut RenderContext) -> Result<(), ValidationError> {
    canonicalize_stemcells(&mut context.properties)
}

/// Rewrite `service_deployment.stemcell` in `tree`
///
/// # Errors
///
/// Returns [`ValidationError::ConflictingConfig`] when both forms are populated.
#[inline]
pub fn canonicalize_stemcells(tree: &mut PropertyTree) -> Result<(), ValidationError> {
    let Some(deployment) = tree
        .get_mut("service_deployment")
        .and_then(Value::as_object_mut)
    else {
        return Ok(());
    };

    let singular = deployment.get("stemcell").cloned().unwrap_or(Value::Null);
    let plural_populated = deployment
        .get("stemcells")
        .and_then(Value::as_array)
        .is_some_and(|stemcells| !stemcells.is_empty());

    if has_content(&singular) && plural_populated {
        return Err(ValidationError::conflicting(
            "Invalid service_deployment config - must specify either stemcell or stemcells, not both",
        ));
    }

    deployment.shift_remove("stemcell");
    if !singular.is_null() && !plural_populated {
        deployment.insert("stemcells".to_owned(), Value::Array(vec![singular]));
    }

    Ok(())
}
