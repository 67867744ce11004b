//! YAML input loading and parsing
//!
//! Every input the renderer consumes (manifest, job specification, link
//! payloads) is read through the [`System`] trait so the loaders can be
//! exercised against an in-memory filesystem.

use crate::config::Manifest;
use crate::config::links::Link;
use crate::config::schema::JobSpec;
use crate::error::InputError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::debug;

/// Load and parse a deployment manifest
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content is not a valid manifest document
#[inline]
pub fn load_manifest(system: &dyn System, path: &str) -> Result<Manifest> {
    let content = read_input(system, path, "Manifest")?;
    let manifest =
        parse_manifest(&content).with_context(|| format!("Failed to load manifest: {path}"))?;
    debug!(
        "Loaded manifest {} with {} top-level properties",
        path,
        manifest.properties.as_map().len()
    );
    Ok(manifest)
}

/// Load a job specification, validating it against the embedded schema
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content is not valid YAML or violates the job spec schema
#[inline]
pub fn load_job_spec(system: &dyn System, path: &str) -> Result<JobSpec> {
    let content = read_input(system, path, "Job specification")?;
    let spec = JobSpec::from_yaml(&content)
        .with_context(|| format!("Failed to load job specification: {path}"))?;
    debug!(
        "Loaded job specification '{}' ({} properties, {} links)",
        spec.name,
        spec.properties.len(),
        spec.consumes.len()
    );
    Ok(spec)
}

/// Load a list of link payloads
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The content is not a YAML list of links
#[inline]
pub fn load_links(system: &dyn System, path: &str) -> Result<Vec<Link>> {
    let content = read_input(system, path, "Links file")?;
    let links = parse_links(&content).with_context(|| format!("Failed to load links: {path}"))?;
    debug!("Loaded {} link(s) from {}", links.len(), path);
    Ok(links)
}

/// Parse a manifest document
///
/// An empty document, or one with `properties: ~`, yields an empty manifest.
///
/// # Errors
///
/// Returns an error if the content is not valid YAML or `properties` is not a map.
#[inline]
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    if content.trim().is_empty() {
        return Ok(Manifest::default());
    }
    serde_yaml::from_str::<Option<Manifest>>(content)
        .map(Option::unwrap_or_default)
        .map_err(|e| InputError::manifest(yaml_error_message(&e)).into())
}

/// Parse a list of link payloads
///
/// # Errors
///
/// Returns an error if the content is not a valid YAML list of links.
#[inline]
pub fn parse_links(content: &str) -> Result<Vec<Link>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str::<Option<Vec<Link>>>(content)
        .map(Option::unwrap_or_default)
        .map_err(|e| InputError::links(yaml_error_message(&e)).into())
}

fn read_input(system: &dyn System, path: &str, what: &str) -> Result<String> {
    let path_obj = Path::new(path);

    if !system.exists(path_obj) {
        return Err(anyhow::anyhow!("{what} not found: {path}"));
    }
    if !system.is_file(path_obj) {
        return Err(anyhow::anyhow!("{what} is not a file: {path}"));
    }

    system
        .read_to_string(path_obj)
        .with_context(|| format!("Failed to read {}: {path}", what.to_lowercase()))
}

fn yaml_error_message(error: &serde_yaml::Error) -> String {
    match error.location() {
        Some(location) => format!(
            "invalid YAML at line {}, column {}: {}",
            location.line(),
            location.column(),
            error
        ),
        None => format!("invalid YAML: {error}"),
    }
}
