//! Merge engine
//!
//! Produces a job's effective properties from the manifest and the job's
//! property schema. Every declared path takes the manifest's value when the
//! key chain exists (including `false`, `0` and `""`), otherwise the declared
//! default. A manifest value of nil counts as unset. Manifest keys outside the
//! schema are dropped.

use crate::config::schema::PropertySchema;
use crate::config::tree::PropertyTree;
use serde_json::Value;

/// Merge manifest properties over schema defaults
#[must_use]
#[inline]
pub fn merge(manifest_properties: &PropertyTree, schema: &PropertySchema) -> PropertyTree {
    let mut effective = PropertyTree::new();

    for (path, default) in schema.iter() {
        let value = match manifest_properties.get(path) {
            Some(&Value::Null) | None => default.clone(),
            Some(value) => value.clone(),
        };
        effective.insert(path, value);
    }

    effective
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: Value) -> PropertyTree {
        PropertyTree::try_from(value).unwrap()
    }

    fn schema() -> PropertySchema {
        PropertySchema::new()
            .with_property("port", json!(8080))
            .with_property("startup_banner", json!(true))
            .with_property("bosh.url", Value::Null)
            .with_property("service_catalog", Value::Null)
    }

    #[test]
    fn defaults_fill_missing_paths() {
        let merged = merge(&PropertyTree::new(), &schema());
        assert_eq!(
            merged.into_value(),
            json!({
                "port": 8080,
                "startup_banner": true,
                "bosh": {"url": null},
                "service_catalog": null
            })
        );
    }

    #[test]
    fn falsy_manifest_values_are_kept() {
        let manifest = tree(json!({"port": 0, "startup_banner": false, "bosh": {"url": ""}}));
        let merged = merge(&manifest, &schema());
        assert_eq!(merged.get("port"), Some(&json!(0)));
        assert_eq!(merged.get("startup_banner"), Some(&json!(false)));
        assert_eq!(merged.get("bosh.url"), Some(&json!("")));
    }

    #[test]
    fn nil_manifest_value_takes_default() {
        let manifest = tree(json!({"port": null}));
        assert_eq!(merge(&manifest, &schema()).get("port"), Some(&json!(8080)));
    }

    #[test]
    fn undeclared_manifest_keys_are_dropped() {
        let manifest = tree(json!({"unknown": 1, "bosh": {"url": "u", "extra": 2}}));
        let merged = merge(&manifest, &schema());
        assert!(!merged.contains("unknown"));
        assert!(!merged.contains("bosh.extra"));
        assert_eq!(merged.str("bosh.url"), Some("u"));
    }

    #[test]
    fn subtree_properties_are_copied_whole() {
        let manifest = tree(json!({"service_catalog": {"id": "x", "plans": [{"name": "p"}]}}));
        let merged = merge(&manifest, &schema());
        assert_eq!(merged.str("service_catalog.plans.0.name"), Some("p"));
    }
}
