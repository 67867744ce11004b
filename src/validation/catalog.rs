//! Service catalog, plan and instance group structure
//!
//! Runs after nil plans and instance groups have been filtered, so an
//! all-nil plan list reads as "no plans".

use crate::canonical::BROKER_LINK;
use crate::config::tree::{PropertyTree, is_blank, lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::{SERVICE_ACCESS_VALUES, plans, require_fields};
use serde_json::Value;

const CATALOG_FIELDS: [&str; 6] = [
    "id",
    "service_name",
    "service_description",
    "bindable",
    "plan_updatable",
    "plans",
];
const PLAN_FIELDS: [&str; 4] = ["name", "plan_id", "description", "instance_groups"];
const INSTANCE_GROUP_FIELDS: [&str; 5] = ["name", "vm_type", "instances", "networks", "azs"];

/// Mandatory service catalog fields
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for the first missing field.
#[inline]
pub fn service_catalog(context: &RenderContext) -> Result<(), ValidationError> {
    let catalog = context
        .properties
        .get("service_catalog")
        .cloned()
        .unwrap_or(Value::Null);
    require_fields(&catalog, "service_catalog", &CATALOG_FIELDS)
}

/// Mandatory plan fields
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for the first missing field.
#[inline]
pub fn plan_fields(context: &RenderContext) -> Result<(), ValidationError> {
    for plan in plans(&context.properties) {
        require_fields(plan, "plan", &PLAN_FIELDS)?;
    }
    Ok(())
}

/// Service access mode and organization of every plan
///
/// # Errors
///
/// Returns an error if `cf_service_access` is not an allowed value, or
/// `service_access_org` is set (or unset) against the access mode.
#[inline]
pub fn service_access(context: &RenderContext) -> Result<(), ValidationError> {
    check_service_access(&context.properties, ValidationError::invalid_enum)
}

/// Service access of the plans exported through the broker link
///
/// # Errors
///
/// Same as [`service_access`], except the enum message leaves the
/// rejected value unquoted.
#[inline]
pub fn linked_service_access(context: &RenderContext) -> Result<(), ValidationError> {
    match context.links.properties(BROKER_LINK) {
        Some(properties) => {
            check_service_access(properties, ValidationError::invalid_enum_unquoted)
        }
        None => Ok(()),
    }
}

fn check_service_access(
    tree: &PropertyTree,
    invalid_enum: fn(&str, &str, &[&str]) -> ValidationError,
) -> Result<(), ValidationError> {
    for plan in plans(tree) {
        let access = lookup(plan, "cf_service_access")
            .and_then(scalar_to_string)
            .unwrap_or_default();

        if !SERVICE_ACCESS_VALUES.contains(&access.as_str()) {
            return Err(invalid_enum(
                "cf_service_access",
                &access,
                &SERVICE_ACCESS_VALUES,
            ));
        }

        let org_set = !is_blank(lookup(plan, "service_access_org"));
        match (access.as_str(), org_set) {
            ("org-restricted", false) => {
                return Err(ValidationError::dependent(
                    "Invalid plan config - must specify service_access_org when cf_service_access is org-restricted",
                ));
            }
            ("enable" | "disable" | "manual", true) => {
                return Err(ValidationError::conflicting(
                    "Invalid plan config - service_access_org is only supported when cf_service_access is org-restricted",
                ));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Mandatory instance group fields of every plan
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for the first missing field.
#[inline]
pub fn instance_groups(context: &RenderContext) -> Result<(), ValidationError> {
    let groups = plans(&context.properties)
        .filter_map(|plan| lookup(plan, "instance_groups"))
        .filter_map(Value::as_array)
        .flatten();

    for group in groups {
        require_fields(group, "instance group", &INSTANCE_GROUP_FIELDS)?;
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn context(catalog: Value) -> RenderContext {
        RenderContext::from_properties(
            PropertyTree::try_from(json!({"service_catalog": catalog})).unwrap(),
        )
    }

    fn plan(access: Value) -> Value {
        json!({
            "name": "dedicated-vm",
            "plan_id": "id",
            "description": "d",
            "cf_service_access": access,
            "instance_groups": [{"name": "g", "vm_type": "small", "instances": 1, "networks": ["n"], "azs": ["z1"]}]
        })
    }

    #[test]
    fn bindable_false_is_present() {
        let ctx = context(json!({
            "id": "x", "service_name": "s", "service_description": "d",
            "bindable": false, "plan_updatable": false, "plans": [plan(json!("enable"))]
        }));
        assert!(service_catalog(&ctx).is_ok());
    }

    #[test]
    fn empty_string_field_is_missing() {
        let ctx = context(json!({"id": "x", "service_name": ""}));
        assert_eq!(
            service_catalog(&ctx).unwrap_err().to_string(),
            "Invalid service_catalog config - must specify service_name"
        );
    }

    #[test]
    fn empty_plans_are_missing() {
        let ctx = context(json!({
            "id": "x", "service_name": "s", "service_description": "d",
            "bindable": true, "plan_updatable": true, "plans": []
        }));
        assert_eq!(
            service_catalog(&ctx).unwrap_err().to_string(),
            "Invalid service_catalog config - must specify plans"
        );
    }

    #[test]
    fn invalid_access_lists_allowed_values() {
        let ctx = context(json!({"plans": [plan(json!("invalid"))]}));
        let err = service_access(&ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidEnum);
        assert_eq!(
            err.to_string(),
            r#"Unsupported value 'invalid' for cf_service_access. Choose from "enable", "disable", "manual", "org-restricted""#
        );
    }

    #[test]
    fn org_restricted_requires_org() {
        let ctx = context(json!({"plans": [plan(json!("org-restricted"))]}));
        assert_eq!(
            service_access(&ctx).unwrap_err().to_string(),
            "Invalid plan config - must specify service_access_org when cf_service_access is org-restricted"
        );

        let mut with_org = plan(json!("org-restricted"));
        with_org["service_access_org"] = json!("my-org");
        assert!(service_access(&context(json!({"plans": [with_org]}))).is_ok());
    }

    #[test]
    fn org_only_with_org_restricted() {
        let mut p = plan(json!("enable"));
        p["service_access_org"] = json!("my-org");
        assert_eq!(
            service_access(&context(json!({"plans": [p]}))).unwrap_err().to_string(),
            "Invalid plan config - service_access_org is only supported when cf_service_access is org-restricted"
        );
    }

    #[test]
    fn empty_azs_are_missing() {
        let mut p = plan(json!("enable"));
        p["instance_groups"][0]["azs"] = json!([]);
        assert_eq!(
            instance_groups(&context(json!({"plans": [p]}))).unwrap_err().to_string(),
            "Invalid instance group config - must specify azs"
        );
    }

    #[test]
    fn missing_plan_field() {
        let mut p = plan(json!("enable"));
        p.as_object_mut().unwrap().shift_remove("plan_id");
        assert_eq!(
            plan_fields(&context(json!({"plans": [p]}))).unwrap_err().to_string(),
            "Invalid plan config - must specify plan_id"
        );
    }
}
