//! Quota gating
//!
//! Quotas are enforced through Cloud Foundry, so any quota requires CF to be
//! configured. Runs after the deprecated quota keys have been folded into
//! `resources`.

use crate::config::tree::{has_content, is_blank, lookup};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::auth::cf_configured;
use crate::validation::{plan_name, plans};
use serde_json::Value;

fn has_resources(quotas: Option<&Value>) -> bool {
    quotas
        .and_then(|quotas| lookup(quotas, "resources"))
        .is_some_and(has_content)
}

fn has_instance_limit(quotas: Option<&Value>) -> bool {
    !is_blank(quotas.and_then(|quotas| lookup(quotas, "service_instance_limit")))
}

/// Global and per-plan quotas only when CF is configured
///
/// # Errors
///
/// Returns [`ValidationError::DependentConfig`] naming whether the offending
/// quota is global or per plan, and instance limit or resource limit.
#[inline]
pub fn quotas(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    if cf_configured(tree) {
        return Ok(());
    }

    let global = tree.get("service_catalog.global_quotas");
    if has_instance_limit(global) {
        return Err(ValidationError::dependent(
            "Invalid quota config - global service_instance_limit requires cf to be configured",
        ));
    }
    if has_resources(global) {
        return Err(ValidationError::dependent(
            "Invalid quota config - global resource limits require cf to be configured",
        ));
    }

    for plan in plans(tree) {
        let quotas = lookup(plan, "quotas");
        if has_instance_limit(quotas) {
            return Err(ValidationError::dependent(format!(
                "Invalid quota config - service_instance_limit for plan {} requires cf to be configured",
                plan_name(plan)
            )));
        }
        if has_resources(quotas) {
            return Err(ValidationError::dependent(format!(
                "Invalid quota config - resource limits for plan {} require cf to be configured",
                plan_name(plan)
            )));
        }
    }
    Ok(())
}
