//! Plan list normalization
//!
//! Manifest templating can leave nil entries in the plan and instance group
//! sequences. They are dropped before anything else looks at the catalog, and
//! a plan without `cf_service_access` gets the default access mode.

use crate::canonical::BROKER_LINK;
use crate::config::tree::PropertyTree;
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::Value;

/// Access mode of a plan that does not set `cf_service_access`
pub const DEFAULT_SERVICE_ACCESS: &str = "enable";

/// Drop nil plans and instance groups, default the service access mode
#[inline]
pub fn normalize_plans(tree: &mut PropertyTree) {
    let Some(plans) = tree
        .get_mut("service_catalog.plans")
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    plans.retain(|plan| !plan.is_null());

    for plan in plans.iter_mut().filter_map(Value::as_object_mut) {
        if let Some(groups) = plan
            .get_mut("instance_groups")
            .and_then(Value::as_array_mut)
        {
            groups.retain(|group| !group.is_null());
        }

        if plan.get("cf_service_access").is_none_or(Value::is_null) {
            plan.insert(
                "cf_service_access".to_owned(),
                Value::String(DEFAULT_SERVICE_ACCESS.to_owned()),
            );
        }
    }
}

/// Normalize the job's own plans
///
/// # Errors
///
/// Never fails; the signature matches the other rules.
#[inline]
pub fn plans(context: &mut RenderContext) -> Result<(), ValidationError> {
    normalize_plans(&mut context.properties);
    Ok(())
}

/// Normalize the plans exported through the broker link
///
/// # Errors
///
/// Never fails; the signature matches the other rules.
#[inline]
pub fn broker_link_plans(context: &mut RenderContext) -> Result<(), ValidationError> {
    if let Some(properties) = context.links.properties_mut(BROKER_LINK) {
        normalize_plans(properties);
    }
    Ok(())
}
