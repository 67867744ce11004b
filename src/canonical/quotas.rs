//! Quota block migration
//!
//! The deprecated quota format keeps resource limits and costs in two
//! parallel maps:
//!
//! ```yaml
//! resource_limits: {ips: 10}          # or {ips: {limit: 10}}
//! resource_costs: {ips: 2}            # plan quotas only
//! ```
//!
//! Both are folded into a single `resources` map with `{limit}` entries
//! (global) or `{limit, cost}` entries (per plan). A value already present in
//! `resources` takes precedence over the deprecated one, and the deprecated
//! keys never survive canonicalization.

use crate::config::tree::PropertyTree;
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::{Map, Value};

const RESOURCES: &str = "resources";
const RESOURCE_LIMITS: &str = "resource_limits";
const RESOURCE_COSTS: &str = "resource_costs";

/// Rewrite the global and per-plan quota blocks
///
/// # Errors
///
/// Never fails; the signature matches the other rules.
#[inline]
pub fn quotas(context: &mut RenderContext) -> Result<(), ValidationError> {
    canonicalize_quotas(&mut context.properties);
    Ok(())
}

/// Rewrite every quota block of a broker property tree
#[inline]
pub fn canonicalize_quotas(tree: &mut PropertyTree) {
    if let Some(global) = tree
        .get_mut("service_catalog.global_quotas")
        .and_then(Value::as_object_mut)
    {
        canonicalize_block(global, false);
    }

    if let Some(plans) = tree
        .get_mut("service_catalog.plans")
        .and_then(Value::as_array_mut)
    {
        for quotas in plans
            .iter_mut()
            .filter_map(|plan| plan.get_mut("quotas"))
            .filter_map(Value::as_object_mut)
        {
            canonicalize_block(quotas, true);
        }
    }
}

/// Fold `resource_limits` (and `resource_costs` when `with_costs`) into `resources`
#[inline]
pub fn canonicalize_block(quotas: &mut Map<String, Value>, with_costs: bool) {
    let limits = quotas.shift_remove(RESOURCE_LIMITS);
    let costs = if with_costs {
        quotas.shift_remove(RESOURCE_COSTS)
    } else {
        None
    };

    if limits.is_none() && costs.is_none() {
        return;
    }

    let resources = quotas
        .entry(RESOURCES)
        .or_insert_with(|| Value::Object(Map::new()));
    if !resources.is_object() {
        *resources = Value::Object(Map::new());
    }
    let Some(resources) = resources.as_object_mut() else {
        return;
    };

    if let Some(Value::Object(limits)) = limits {
        fold_entries(resources, limits, "limit");
    }
    if let Some(Value::Object(costs)) = costs {
        fold_entries(resources, costs, "cost");
    }
}

fn fold_entries(resources: &mut Map<String, Value>, entries: Map<String, Value>, field: &str) {
    for (name, entry) in entries {
        let value = match entry {
            Value::Object(mut nested) => nested.shift_remove(field),
            Value::Null => None,
            scalar @ (Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Array(_)) => {
                Some(scalar)
            }
        };
        let Some(value) = value.filter(|v| !v.is_null()) else {
            continue;
        };

        let resource = resources
            .entry(name)
            .or_insert_with(|| Value::Object(Map::new()));
        if resource.is_null() {
            *resource = Value::Object(Map::new());
        }
        if let Some(resource) = resource.as_object_mut() {
            resource.entry(field).or_insert(value);
        }
    }
}
