//! Configuration inputs and their resolution
//!
//! Handles the property tree model, job specifications with their embedded
//! JSON schema, manifest/schema merging, and link resolution.

pub mod links;
pub mod merge;
pub mod schema;
pub mod tree;
pub mod yaml;

use crate::config::schema::null_as_default;
use serde::{Deserialize, Serialize};

pub use links::{Link, LinkConsumerDeclaration, LinkInstance, ResolvedLinks, resolve_links};
pub use merge::merge;
pub use schema::{JobSpec, PropertySchema};
pub use tree::PropertyTree;

/// Deployment manifest as far as a single job is concerned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Deployment name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Job properties supplied by the operator
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: PropertyTree,
}

impl Manifest {
    /// Load a manifest from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[inline]
    pub fn load_from_file(system: &dyn crate::system::System, path: &str) -> anyhow::Result<Self> {
        yaml::load_manifest(system, path)
    }
}
