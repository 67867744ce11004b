//! Service deployment releases and stemcells
//!
//! Every release needs a name, an exact version and its jobs; every stemcell
//! needs an OS and an exact version. Floating versions (`latest`,
//! `<n>.latest`) would hide pending changes from `cf update-service`.

use crate::config::tree::{lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::{is_missing, require_fields};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Rejection for `latest` and `<n>.latest` versions
pub const VERSION_PINNING_MESSAGE: &str = "You must configure the exact release and stemcell versions in broker.service_deployment. ODB requires exact versions to detect pending changes as part of the 'cf update-service' workflow. For example, latest and 3112.latest are not supported.";

#[allow(clippy::expect_used, reason = "The pattern is a compile-time constant")]
static FLOATING_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.)?latest$").expect("floating version pattern is valid")
});

/// Whether `version` floats instead of pinning an exact version
#[must_use]
#[inline]
pub fn is_floating_version(version: &str) -> bool {
    FLOATING_VERSION.is_match(version)
}

/// Releases are present and complete
///
/// # Errors
///
/// Returns an error if `releases` is missing or empty, or a release lacks
/// `name`, `version` or `jobs`.
#[inline]
pub fn releases(context: &RenderContext) -> Result<(), ValidationError> {
    let releases = match context.properties.get("service_deployment.releases") {
        None | Some(&Value::Null) => {
            return Err(ValidationError::missing_field(
                "service_deployment",
                "releases",
            ));
        }
        Some(&Value::Array(ref releases)) if !releases.is_empty() => releases,
        Some(_) => {
            return Err(ValidationError::missing(
                "Invalid service_deployment config - must specify at least one release",
            ));
        }
    };

    for release in releases {
        require_fields(
            release,
            "service_deployment.releases",
            &["name", "version", "jobs"],
        )?;
    }
    Ok(())
}

/// Stemcells are present and complete
///
/// # Errors
///
/// Returns an error if no stemcell is configured or one lacks `os` or `version`.
#[inline]
pub fn stemcells(context: &RenderContext) -> Result<(), ValidationError> {
    let stemcells = context.properties.get("service_deployment.stemcells");
    if is_missing(stemcells) {
        return Err(ValidationError::missing_field(
            "service_deployment",
            "stemcells",
        ));
    }

    for stemcell in stemcells.and_then(Value::as_array).into_iter().flatten() {
        require_fields(stemcell, "service_deployment.stemcell", &["os", "version"])?;
    }
    Ok(())
}

/// Release and stemcell versions are exact
///
/// # Errors
///
/// Returns [`ValidationError::InvalidVersion`] for the first floating version.
#[inline]
pub fn version_pinning(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    let versions = ["service_deployment.releases", "service_deployment.stemcells"]
        .into_iter()
        .filter_map(|path| tree.get(path).and_then(Value::as_array))
        .flatten()
        .filter_map(|entry| lookup(entry, "version"))
        .filter_map(scalar_to_string);

    for version in versions {
        if is_floating_version(&version) {
            return Err(ValidationError::invalid_version(VERSION_PINNING_MESSAGE));
        }
    }
    Ok(())
}
