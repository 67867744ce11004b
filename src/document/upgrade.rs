//! Upgrade and recreate errands
//!
//! Both errands walk every service instance through the broker API, so they
//! share one document: endpoints, director access, and the rollout pacing.

use super::EffectiveDocument;
use super::blocks::{self, field, field_or};
use super::url::broker_url;
use crate::canonical::BROKER_LINK;
use crate::config::tree::{PropertyTree, has_content, lookup};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::plans;
use serde_json::{Value, json};

/// Rollout settings and their defaults, in output order
pub const PACING_DEFAULTS: [(&str, i64); 6] = [
    ("polling_interval", 60),
    ("attempt_interval", 60),
    ("attempt_limit", 5),
    ("request_timeout", 120),
    ("max_in_flight", 1),
    ("canaries", 0),
];

/// Path of the instance listing relative to the broker URL
pub const SERVICE_INSTANCES_PATH: &str = "/mgmt/service_instances";

/// Assemble an upgrade or recreate document
///
/// # Errors
///
/// Returns an error if the broker URL can be neither read from `broker_uri`
/// nor derived from the broker link.
#[inline]
pub fn assemble(context: &RenderContext) -> Result<EffectiveDocument, ValidationError> {
    let properties = &context.properties;
    let link = context.links.get(BROKER_LINK);
    let exported = link.map(|link| link.properties.clone()).unwrap_or_default();

    let url = broker_url(properties.str("broker_uri"), link)?;
    let basic = json!({
        "username": field(&exported, "username"),
        "password": field(&exported, "password"),
    });

    let mut tree = PropertyTree::new();
    tree.insert(
        "broker_api",
        json!({
            "url": url,
            "authentication": {"basic": basic.clone()},
            "tls": {
                "ca_cert": field_or(properties, "broker_ca_cert", json!("")),
                "disable_ssl_cert_verification":
                    properties.bool_or("disable_ssl_cert_verification", false),
            },
        }),
    );
    tree.insert("service_instances_api", service_instances_api(properties, &url, basic));
    tree.insert("bosh", blocks::bosh(&exported));
    tree.insert("cf", blocks::cf(&exported));

    for (property, default) in PACING_DEFAULTS {
        tree.insert(property, field_or(properties, property, json!(default)));
    }
    if properties
        .get("canary_selection_params")
        .is_some_and(has_content)
    {
        tree.insert(
            "canary_selection_params",
            field(properties, "canary_selection_params"),
        );
    }

    tree.insert(
        "maintenance_info_present",
        Value::Bool(maintenance_info_present(&exported)),
    );

    Ok(EffectiveDocument::new(tree))
}

/// Explicit instance listing endpoint, else the broker's own
fn service_instances_api(properties: &PropertyTree, broker_url: &str, broker_basic: Value) -> Value {
    if properties.is_blank("service_instances_api.url") {
        return json!({
            "url": format!("{}{SERVICE_INSTANCES_PATH}", broker_url.trim_end_matches('/')),
            "authentication": {"basic": broker_basic},
        });
    }

    let mut api = PropertyTree::new();
    api.insert("url", field(properties, "service_instances_api.url"));
    api.insert(
        "authentication.basic",
        json!({
            "username": field(properties, "service_instances_api.authentication.basic.username"),
            "password": field(properties, "service_instances_api.authentication.basic.password"),
        }),
    );
    if !properties.is_blank("service_instances_api.root_ca_cert") {
        api.insert(
            "root_ca_cert",
            field(properties, "service_instances_api.root_ca_cert"),
        );
    }
    api.into_value()
}

/// Whether the catalog or any plan declares maintenance info
fn maintenance_info_present(exported: &PropertyTree) -> bool {
    exported
        .get("service_catalog.maintenance_info")
        .is_some_and(has_content)
        || plans(exported).any(|plan| lookup(plan, "maintenance_info").is_some_and(has_content))
}
