//! Service backup destinations
//!
//! Each destination names a storage type and carries that type's config. All
//! missing config keys of a destination are reported together, in
//! declaration order, followed by the operator's `missing_properties_message`.

use crate::config::tree::{is_blank, lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::{Value, json};

/// Root of the service backup job's properties
pub const BACKUP_ROOT: &str = "service-backup";

/// Fields every backup needs once a destination is configured
pub const COMMON_FIELDS: [&str; 2] = ["source_folder", "cron_schedule"];

/// Supported backup storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DestinationType {
    /// Amazon S3 or a compatible endpoint
    S3,
    /// Google Cloud Storage
    Gcs,
    /// A remote host reached over SCP
    Scp,
    /// Azure Blob Storage
    Azure,
}

impl DestinationType {
    /// Look up a destination type by its manifest name
    #[must_use]
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "s3" => Some(Self::S3),
            "gcs" => Some(Self::Gcs),
            "scp" => Some(Self::Scp),
            "azure" => Some(Self::Azure),
            _ => None,
        }
    }

    /// Manifest name
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Gcs => "gcs",
            Self::Scp => "scp",
            Self::Azure => "azure",
        }
    }

    /// Config keys that must be set
    #[must_use]
    #[inline]
    pub const fn required_keys(self) -> &'static [&'static str] {
        match self {
            Self::S3 => &["bucket_name", "bucket_path", "access_key_id", "secret_access_key"],
            Self::Gcs => &["service_account_json", "project_id", "bucket_name"],
            Self::Scp => &["server", "user", "destination", "key"],
            Self::Azure => &["storage_account", "storage_access_key", "container", "path"],
        }
    }

    /// Optional config keys with their defaults, in output position
    #[must_use]
    #[inline]
    pub fn optional_keys(self) -> Vec<(&'static str, Value)> {
        match self {
            Self::S3 => vec![("endpoint_url", json!("")), ("region", json!(""))],
            Self::Gcs => Vec::new(),
            Self::Scp => vec![("fingerprint", json!("")), ("port", json!(22))],
            Self::Azure => vec![("blob_store_base_url", json!("core.windows.net"))],
        }
    }

    /// Whether the optional keys come before the required ones in the output
    #[must_use]
    #[inline]
    pub const fn optional_first(self) -> bool {
        matches!(self, Self::S3)
    }
}

/// Message appended to every backup configuration error
#[must_use]
#[inline]
pub fn missing_properties_message(context: &RenderContext) -> String {
    context
        .properties
        .get(&format!("{BACKUP_ROOT}.missing_properties_message"))
        .and_then(scalar_to_string)
        .unwrap_or_default()
}

/// Destinations are complete and the common backup fields are set
///
/// # Errors
///
/// Returns an error if a destination lacks a type, has an unknown type, lacks
/// its config block or config keys, or the common fields are missing.
#[inline]
pub fn destinations(context: &RenderContext) -> Result<(), ValidationError> {
    let tree = &context.properties;
    let suffix = missing_properties_message(context);
    let destinations = tree
        .get(&format!("{BACKUP_ROOT}.destinations"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for destination in destinations {
        check_destination(destination, &suffix)?;
    }

    if destinations.is_empty() {
        return Ok(());
    }

    let missing: Vec<&str> = COMMON_FIELDS
        .into_iter()
        .filter(|field| tree.is_blank(&format!("{BACKUP_ROOT}.{field}")))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing(format!(
            "Invalid config - Missing values for service_backup: {}.\n{suffix}",
            missing.join(", ")
        )))
    }
}

fn check_destination(destination: &Value, suffix: &str) -> Result<(), ValidationError> {
    let Some(type_name) = lookup(destination, "type")
        .and_then(scalar_to_string)
        .filter(|name| !name.is_empty())
    else {
        return Err(ValidationError::missing(format!(
            "Invalid config - Missing type for destination.\n{suffix}"
        )));
    };

    let Some(kind) = DestinationType::from_name(&type_name) else {
        return Err(ValidationError::InvalidEnum {
            message: format!("Invalid config - Unknown destination type: {type_name}.\n{suffix}"),
        });
    };

    let Some(config) = lookup(destination, "config").filter(|config| !config.is_null()) else {
        return Err(ValidationError::missing(format!(
            "Invalid config - Missing config for {}.\n{suffix}",
            kind.name()
        )));
    };

    let missing: Vec<&str> = kind
        .required_keys()
        .iter()
        .copied()
        .filter(|key| is_blank(lookup(config, key)))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::missing(format!(
            "Invalid config - Missing values for {}: {}.\n{suffix}",
            kind.name(),
            missing.join(", ")
        )))
    }
}
