//! Upgrade and recreate errand bounds

use crate::config::tree::has_content;
use crate::error::ValidationError;
use crate::render::RenderContext;

/// Numeric bounds and the canary selection conflict
///
/// # Errors
///
/// Returns an error if:
/// - `attempt_limit` or `max_in_flight` is below 1
/// - `canaries` is negative
/// - Both `canaries` and `canary_selection_params` are set
#[inline]
pub fn errand_bounds(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    let prefix = context.job.property_prefix();

    for (property, minimum) in [("attempt_limit", 1), ("max_in_flight", 1), ("canaries", 0)] {
        if tree.i64(property).is_some_and(|value| value < minimum) {
            return Err(ValidationError::out_of_range(
                &format!("{prefix}.{property}"),
                minimum,
            ));
        }
    }

    let canaries = tree.i64("canaries").unwrap_or(0);
    let selection = tree
        .get("canary_selection_params")
        .is_some_and(has_content);
    if canaries > 0 && selection {
        return Err(ValidationError::conflicting(format!(
            "Invalid {prefix} - for the upgrade you must either set canary_selection_params OR canaries, not both"
        )));
    }

    Ok(())
}
