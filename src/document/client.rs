//! Broker API clients
//!
//! The metrics adapter and the orphan deployment checker only need to reach
//! the broker: its URL and basic credentials, the latter also quoted for the
//! scripts that call `curl`.

use super::EffectiveDocument;
use super::blocks::{field, field_or};
use super::shell::shell_escape;
use super::url::broker_url;
use crate::canonical::BROKER_LINK;
use crate::config::tree::{PropertyTree, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::{Value, json};

/// Seconds the orphan check waits for the broker
pub const DEFAULT_ORPHAN_REQUEST_TIMEOUT: i64 = 30;

/// Assemble the service metrics adapter document
///
/// # Errors
///
/// Returns an error if the broker URL cannot be determined.
#[inline]
pub fn metrics(context: &RenderContext) -> Result<EffectiveDocument, ValidationError> {
    let properties = &context.properties;
    let mut tree = broker_client(context)?;

    tree.insert(
        "disable_ssl_cert_verification",
        Value::Bool(properties.bool_or("disable_ssl_cert_verification", false)),
    );
    if !properties.is_blank("tls.ca_cert") {
        tree.insert("tls.ca_cert", field(properties, "tls.ca_cert"));
    }

    Ok(EffectiveDocument::new(tree))
}

/// Assemble the orphan deployments document
///
/// # Errors
///
/// Returns an error if the broker URL cannot be determined.
#[inline]
pub fn orphans(context: &RenderContext) -> Result<EffectiveDocument, ValidationError> {
    let mut tree = broker_client(context)?;
    tree.insert(
        "request_timeout",
        field_or(
            &context.properties,
            "request_timeout",
            json!(DEFAULT_ORPHAN_REQUEST_TIMEOUT),
        ),
    );
    Ok(EffectiveDocument::new(tree))
}

fn broker_client(context: &RenderContext) -> Result<PropertyTree, ValidationError> {
    let link = context.links.get(BROKER_LINK);
    let exported = link.map(|link| link.properties.clone()).unwrap_or_default();
    let url = broker_url(context.properties.str("broker_uri"), link)?;

    let username = exported
        .get("username")
        .and_then(scalar_to_string)
        .unwrap_or_default();
    let password = exported
        .get("password")
        .and_then(scalar_to_string)
        .unwrap_or_default();

    let mut tree = PropertyTree::new();
    tree.insert("broker_url", Value::String(url));
    tree.insert("broker_username", Value::String(username.clone()));
    tree.insert("broker_password", Value::String(password.clone()));
    tree.insert(
        "shell",
        json!({
            "broker_username": shell_escape(&username),
            "broker_password": shell_escape(&password),
        }),
    );
    Ok(tree)
}
