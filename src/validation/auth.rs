//! Authentication exclusivity
//!
//! BOSH accepts basic auth or UAA client credentials; CF accepts UAA client
//! credentials or user credentials. Exactly one mode must be configured. A
//! mode counts as configured when any of its fields is non-blank.

use crate::config::tree::PropertyTree;
use crate::error::ValidationError;
use crate::render::RenderContext;

const BOSH_BASIC: [&str; 2] = [
    "bosh.authentication.basic.username",
    "bosh.authentication.basic.password",
];
const BOSH_UAA: [&str; 2] = [
    "bosh.authentication.uaa.client_id",
    "bosh.authentication.uaa.client_secret",
];
const CF_CLIENT: [&str; 2] = [
    "cf.uaa.authentication.client_credentials.client_id",
    "cf.uaa.authentication.client_credentials.client_secret",
];
const CF_USER: [&str; 2] = [
    "cf.uaa.authentication.user_credentials.username",
    "cf.uaa.authentication.user_credentials.password",
];

fn configured(tree: &PropertyTree, paths: &[&str]) -> bool {
    paths.iter().any(|path| !tree.is_blank(path))
}

/// Whether the broker talks to Cloud Foundry at all
#[must_use]
#[inline]
pub fn cf_configured(tree: &PropertyTree) -> bool {
    !tree.is_blank("cf.url")
}

/// Exactly one BOSH authentication mode
///
/// # Errors
///
/// Returns an error if both or neither of basic and UAA auth are configured.
#[inline]
pub fn bosh(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    match (configured(tree, &BOSH_BASIC), configured(tree, &BOSH_UAA)) {
        (true, true) => Err(ValidationError::conflicting(
            "Invalid bosh config - must only specify one type of authentication",
        )),
        (false, false) => Err(ValidationError::missing(
            "Invalid bosh config - must specify authentication",
        )),
        (true, false) | (false, true) => Ok(()),
    }
}

/// Exactly one CF credential type, when CF is configured
///
/// # Errors
///
/// Returns an error if both or neither of client and user credentials are set.
#[inline]
pub fn cf(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    if !cf_configured(tree) {
        return Ok(());
    }

    match (configured(tree, &CF_CLIENT), configured(tree, &CF_USER)) {
        (true, true) => Err(ValidationError::conflicting(
            "Invalid CF authentication config - must specify either client or user credentials",
        )),
        (false, false) => Err(ValidationError::missing(
            "Invalid CF authentication config - must specify credentials",
        )),
        (true, false) | (false, true) => Ok(()),
    }
}
