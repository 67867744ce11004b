//! CredHub dependent features
//!
//! Secure binding credentials need UAA client credentials plus a populated
//! `credhub` link. Secure manifests need `use_stdin` and a complete
//! `bosh_credhub_api` descriptor.

use crate::config::tree::{is_blank, lookup};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::Value;

/// Name of the link exported by CredHub
pub const CREDHUB_LINK: &str = "credhub";

/// Fields of the CredHub link that make it usable
pub const CREDHUB_LINK_FIELDS: [&str; 3] = [
    "credhub.port",
    "credhub.ca_certificate",
    "credhub.internal_url",
];

/// Whether the broker stores binding credentials in CredHub
#[must_use]
#[inline]
pub fn secure_binding_enabled(context: &RenderContext) -> bool {
    context
        .properties
        .bool_or("secure_binding_credentials.enabled", false)
}

/// Secure binding credentials configuration and CredHub link
///
/// # Errors
///
/// Returns an error if:
/// - The UAA client id or secret is missing
/// - No `credhub` link was supplied
/// - The `credhub` link has blank port, CA certificate and internal URL
#[inline]
pub fn secure_binding(context: &RenderContext) -> Result<(), ValidationError> {
    if !secure_binding_enabled(context) {
        return Ok(());
    }

    let tree = &context.properties;
    for field in ["client_id", "client_secret"] {
        if tree.is_blank(&format!(
            "secure_binding_credentials.authentication.uaa.{field}"
        )) {
            return Err(ValidationError::missing_field(
                "secure_binding_credentials",
                field,
            ));
        }
    }

    let Some(link) = context.links.properties(CREDHUB_LINK) else {
        return Err(ValidationError::dependent(
            "secure_binding_credentials is enabled, but no CredHub link was provided",
        ));
    };

    if CREDHUB_LINK_FIELDS.iter().all(|path| link.is_blank(path)) {
        return Err(ValidationError::empty_link(
            "Secure service binding is enabled but CredHub link is empty",
        ));
    }

    Ok(())
}

/// Secure manifests companion configuration
///
/// # Errors
///
/// Returns an error if:
/// - `use_stdin` is disabled
/// - Any `bosh_credhub_api` field is missing (the first gap is named)
#[inline]
pub fn secure_manifests(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    if !tree.bool_or("enable_secure_manifests", false) {
        return Ok(());
    }

    if !tree.bool_or("use_stdin", true) {
        return Err(ValidationError::dependent(
            "enable_secure_manifests requires use_stdin to be enabled",
        ));
    }

    let api = tree.get("bosh_credhub_api").cloned().unwrap_or(Value::Null);
    let fields = [
        ("url", "url"),
        ("root_ca_cert", "root_ca_cert"),
        (
            "client_id",
            "authentication.uaa.client_credentials.client_id",
        ),
        (
            "client_secret",
            "authentication.uaa.client_credentials.client_secret",
        ),
    ];

    match fields
        .iter()
        .find(|&&(_, path)| is_blank(lookup(&api, path)))
    {
        Some(&(name, _)) => Err(ValidationError::dependent(format!(
            "Invalid bosh_credhub_api config - must specify {name}"
        ))),
        None => Ok(()),
    }
}
