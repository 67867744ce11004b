//! DNS binding addresses
//!
//! A plan's `binding_with_dns` entries ask the broker to hand out BOSH DNS
//! addresses. Only a fixed set of query properties is understood, and the
//! feature needs the manifest to be passed through stdin.

use crate::config::tree::{lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::{plan_name, plans, require_fields};
use serde_json::Value;

/// Allowed values of a DNS binding's `status`
pub const DNS_STATUS_VALUES: [&str; 4] = ["default", "healthy", "unhealthy", "all"];

const REQUIRED_FIELDS: [&str; 3] = ["name", "link_provider", "instance_group"];

/// Every DNS binding entry is well-formed and `use_stdin` is enabled
///
/// # Errors
///
/// Returns an error if an entry lacks a required field, sets an unknown or
/// malformed property, or the plan uses DNS bindings while `use_stdin` is off.
#[inline]
pub fn dns_bindings(context: &RenderContext) -> Result<(), ValidationError> {
    let use_stdin = context.properties.bool_or("use_stdin", true);

    for plan in plans(&context.properties) {
        let Some(bindings) = lookup(plan, "binding_with_dns").and_then(Value::as_array) else {
            continue;
        };

        for binding in bindings {
            check_binding(binding)?;
        }

        if !bindings.is_empty() && !use_stdin {
            return Err(ValidationError::dependent(format!(
                "Plan {} uses binding_with_dns, which requires use_stdin to be enabled",
                plan_name(plan)
            )));
        }
    }
    Ok(())
}

fn check_binding(binding: &Value) -> Result<(), ValidationError> {
    require_fields(binding, "binding_with_dns", &REQUIRED_FIELDS)?;

    let Some(properties) = lookup(binding, "properties").and_then(Value::as_object) else {
        return Ok(());
    };

    for (key, value) in properties {
        match key.as_str() {
            "azs" => {
                if !value.is_array() {
                    return Err(ValidationError::invalid_shape(
                        "Invalid binding_with_dns config - azs must be an array",
                    ));
                }
            }
            "status" => {
                let status = scalar_to_string(value).unwrap_or_default();
                if !DNS_STATUS_VALUES.contains(&status.as_str()) {
                    return Err(ValidationError::invalid_enum(
                        "binding_with_dns status",
                        &status,
                        &DNS_STATUS_VALUES,
                    ));
                }
            }
            unsupported => {
                return Err(ValidationError::invalid_shape(format!(
                    "Invalid binding_with_dns config - unsupported property '{unsupported}'"
                )));
            }
        }
    }
    Ok(())
}
