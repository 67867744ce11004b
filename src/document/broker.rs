//! Broker document
//!
//! The broker reads its effective properties nearly as merged. Director and
//! Cloud Foundry credentials are reshaped, and the secure binding settings
//! are replaced by a `credhub` block once CredHub is wired in.

use super::EffectiveDocument;
use super::blocks::{self, field};
use crate::config::tree::scalar_to_string;
use crate::render::RenderContext;
use crate::validation::credhub::{CREDHUB_LINK, secure_binding_enabled};
use serde_json::{Value, json};

/// Assemble the broker's effective document
#[must_use]
#[inline]
pub fn assemble(context: &RenderContext) -> EffectiveDocument {
    let properties = &context.properties;
    let mut tree = properties.clone();

    tree.insert("bosh", blocks::bosh(properties));
    if properties.contains("cf") {
        tree.insert("cf", blocks::cf(properties));
    }

    tree.remove("secure_binding_credentials");
    if secure_binding_enabled(context) {
        tree.insert("credhub", credhub(context));
    }

    EffectiveDocument::new(tree)
}

fn credhub(context: &RenderContext) -> Value {
    let uaa = context
        .properties
        .subtree("secure_binding_credentials.authentication.uaa");
    let link = context
        .links
        .properties(CREDHUB_LINK)
        .cloned()
        .unwrap_or_default();

    let port = link.get("credhub.port").and_then(scalar_to_string);
    let api_url = match (link.str("credhub.internal_url"), port) {
        (Some(host), Some(port)) => Value::String(format!("https://{host}:{port}")),
        _ => Value::Null,
    };

    json!({
        "api_url": api_url,
        "ca_cert": field(&link, "credhub.ca_certificate"),
        "client_id": field(&uaa, "client_id"),
        "client_secret": field(&uaa, "client_secret"),
        "internal_uaa_ca_cert": field(&uaa, "ca_cert"),
    })
}
