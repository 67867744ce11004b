//! Document assembly
//!
//! Composes validated sections into the per-job effective document handed
//! to the template renderer, and formats credentials for shell embedding.

pub mod backup;
pub mod blocks;
pub mod broker;
pub mod client;
pub mod deregister;
pub mod indicators;
pub mod register;
pub mod shell;
pub mod upgrade;
pub mod url;

use core::str::FromStr;

use crate::config::tree::PropertyTree;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Serialization of an effective document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum OutputFormat {
    /// YAML, as consumed by the job templates
    #[default]
    Yaml,
    /// Pretty-printed JSON
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Use 'yaml' or 'json'")),
        }
    }
}

/// The final, validated configuration of one job
///
/// Built once per render and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EffectiveDocument {
    tree: PropertyTree,
}

impl EffectiveDocument {
    pub(crate) const fn new(tree: PropertyTree) -> Self {
        Self { tree }
    }

    /// Value at a dotted path
    #[must_use]
    #[inline]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.tree.get(path)
    }

    /// Borrow the document tree
    #[must_use]
    #[inline]
    pub const fn as_tree(&self) -> &PropertyTree {
        &self.tree
    }

    /// Take the document tree
    #[must_use]
    #[inline]
    pub fn into_tree(self) -> PropertyTree {
        self.tree
    }

    /// Serialize the document
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be serialized.
    #[inline]
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&self.tree)?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&self.tree)?),
        }
    }
}
