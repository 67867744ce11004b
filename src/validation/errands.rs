//! Plan lifecycle errands

use crate::config::tree::lookup;
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::plans;
use serde_json::Value;

const ERRAND_KINDS: [&str; 2] = ["post_deploy", "pre_delete"];

/// `lifecycle_errands.<kind>` is a sequence and each `disabled` flag a boolean
///
/// # Errors
///
/// Returns [`ValidationError::InvalidShape`] for the first malformed entry.
#[inline]
pub fn lifecycle_errands(context: &RenderContext) -> Result<(), ValidationError> {
    for plan in plans(&context.properties) {
        for kind in ERRAND_KINDS {
            let errands = match lookup(plan, &format!("lifecycle_errands.{kind}")) {
                None | Some(&Value::Null) => continue,
                Some(&Value::Array(ref errands)) => errands,
                Some(_) => {
                    return Err(ValidationError::invalid_shape(format!(
                        "Plan property lifecycle_errands.{kind} must be an array."
                    )));
                }
            };

            let bad_flag = errands
                .iter()
                .filter_map(|errand| lookup(errand, "disabled"))
                .any(|disabled| !disabled.is_null() && !disabled.is_boolean());
            if bad_flag {
                return Err(ValidationError::invalid_shape(format!(
                    "Plan property lifecycle_errands.{kind}.disabled must be a boolean."
                )));
            }
        }
    }
    Ok(())
}
