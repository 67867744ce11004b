//! Deregister errands
//!
//! Both errands remove the broker from Cloud Foundry. The delete-all variant
//! first purges every service instance and polls until Cloud Foundry reports
//! the deletions complete.

use super::EffectiveDocument;
use super::blocks::{field, field_or};
use crate::canonical::BROKER_LINK;
use crate::config::tree::PropertyTree;
use crate::render::RenderContext;
use serde_json::{Value, json};

/// Seconds between polls of the deletion status
pub const DEFAULT_POLLING_INTERVAL: i64 = 60;

/// Seconds before the first poll
pub const DEFAULT_POLLING_INITIAL_OFFSET: i64 = 5;

/// Assemble a deregister document
#[must_use]
#[inline]
pub fn assemble(context: &RenderContext, delete_all: bool) -> EffectiveDocument {
    let properties = &context.properties;
    let exported = context
        .links
        .properties(BROKER_LINK)
        .cloned()
        .unwrap_or_default();

    let mut tree = PropertyTree::new();
    tree.insert("broker_name", field(properties, "broker_name"));
    tree.insert(
        "disable_ssl_cert_verification",
        Value::Bool(exported.bool_or("disable_ssl_cert_verification", false)),
    );
    tree.insert(
        "cf",
        json!({
            "url": field(&exported, "cf.url"),
            "root_ca_cert": field(&exported, "cf.root_ca_cert"),
            "uaa": field(&exported, "cf.uaa"),
        }),
    );

    if delete_all {
        tree.insert("service_catalog.id", field(&exported, "service_catalog.id"));
        tree.insert(
            "polling_interval",
            field_or(properties, "polling_interval", json!(DEFAULT_POLLING_INTERVAL)),
        );
        tree.insert(
            "polling_initial_offset",
            field_or(
                properties,
                "polling_initial_offset",
                json!(DEFAULT_POLLING_INITIAL_OFFSET),
            ),
        );
    }

    EffectiveDocument::new(tree)
}
