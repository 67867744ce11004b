//! Job specifications and their property schema
//!
//! A job specification declares every property the job recognizes (as a
//! dotted path with an optional default) and the links it consumes. The
//! document is checked against an embedded JSON schema before it is
//! deserialized.

use crate::config::links::LinkConsumerDeclaration;
use crate::error::InputError;
use anyhow::{Result, anyhow};
use indexmap::IndexMap;
use jsonschema::Validator;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single property declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Value used when the manifest does not set the property
    #[serde(default)]
    pub default: Value,
}

/// Parsed job specification
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobSpec {
    /// Job name
    pub name: String,

    /// Links this job expects to consume
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumes: Vec<LinkConsumerDeclaration>,

    /// Declared properties, keyed by dotted path, in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub properties: IndexMap<String, Option<PropertyDefinition>>,
}

impl JobSpec {
    /// Parse a job specification from YAML, validating it against the schema
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The content is not valid YAML
    /// - The document violates the job spec schema
    #[inline]
    pub fn from_yaml(content: &str) -> Result<Self> {
        let document: Value = serde_yaml::from_str(content).map_err(|e| {
            if let Some(location) = e.location() {
                InputError::job_spec(format!(
                    "invalid YAML at line {}, column {}: {}",
                    location.line(),
                    location.column(),
                    e
                ))
            } else {
                InputError::job_spec(format!("invalid YAML: {e}"))
            }
        })?;

        validate_against_schema(&document)?;

        serde_json::from_value(document)
            .map_err(|e| InputError::job_spec(format!("unexpected structure: {e}")).into())
    }

    /// Project the property declarations onto a path -> default schema
    #[must_use]
    #[inline]
    pub fn property_schema(&self) -> PropertySchema {
        self.properties
            .iter()
            .map(|(path, definition)| {
                let default = definition
                    .as_ref()
                    .map_or(Value::Null, |def| def.default.clone());
                (path.clone(), default)
            })
            .collect()
    }
}

/// Ordered mapping from dotted property path to default value
///
/// Loaded once per job and owned by the caller; the merge engine only reads it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySchema {
    defaults: IndexMap<String, Value>,
}

impl PropertySchema {
    /// Create an empty schema
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a property (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_property<S: Into<String>>(mut self, path: S, default: Value) -> Self {
        self.defaults.insert(path.into(), default);
        self
    }

    /// Default declared for `path`
    #[must_use]
    #[inline]
    pub fn default_for(&self, path: &str) -> Option<&Value> {
        self.defaults.get(path)
    }

    /// Declared paths and defaults in declaration order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.defaults
            .iter()
            .map(|(path, default)| (path.as_str(), default))
    }

    /// Number of declared properties
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.defaults.len()
    }

    /// Whether no property is declared
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.defaults.is_empty()
    }
}

impl FromIterator<(String, Value)> for PropertySchema {
    #[inline]
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            defaults: iter.into_iter().collect(),
        }
    }
}

/// Compile the embedded job spec schema
///
/// # Errors
///
/// Returns an error if the embedded schema cannot be parsed or compiled
#[inline]
pub fn get_schema() -> Result<Validator> {
    let schema_str = include_str!("../../docs/job-spec.schema.json");
    let schema: Value = serde_json::from_str(schema_str)
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {e}"))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {e}"))
}

/// Validate a job spec document against the schema
///
/// # Errors
///
/// Returns an error listing every schema violation
#[inline]
pub fn validate_against_schema(document: &Value) -> Result<()> {
    let schema = get_schema()?;

    let error_messages: Vec<String> = schema
        .iter_errors(document)
        .map(|e| format!("  - {e}"))
        .collect();

    if !error_messages.is_empty() {
        return Err(InputError::job_spec(format!(
            "schema validation failed:\n{}",
            error_messages.join("\n")
        ))
        .into());
    }

    Ok(())
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
