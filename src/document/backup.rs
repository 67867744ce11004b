//! Service backup document
//!
//! Destinations are rewritten with their config keys in a fixed order and
//! optional keys defaulted. Everything else is read from the
//! `service-backup` block, with the packaged tool locations filled in.

use super::EffectiveDocument;
use super::blocks::field_or;
use crate::config::tree::{PropertyTree, lookup};
use crate::render::RenderContext;
use crate::validation::backup::{BACKUP_ROOT, DestinationType};
use serde_json::{Map, Value, json};

/// Default hint appended to backup configuration errors
pub const DEFAULT_MISSING_PROPERTIES_MESSAGE: &str = "Provide these missing fields in your manifest.";

/// Settings copied from the `service-backup` block with their defaults
fn settings() -> [(&'static str, Value); 12] {
    [
        ("add_deployment_name_to_backup_path", json!(false)),
        ("alerts", Value::Null),
        ("aws_cli_path", json!("/var/vcap/packages/service-backup_aws-cli/bin/aws")),
        ("azure_cli_path", json!("/var/vcap/packages/service-backup_blobxfer/bin/blobxfer")),
        ("source_folder", Value::Null),
        ("source_executable", Value::Null),
        ("cron_schedule", Value::Null),
        ("backup_user", json!("vcap")),
        ("cleanup_executable", json!("")),
        ("missing_properties_message", json!(DEFAULT_MISSING_PROPERTIES_MESSAGE)),
        ("exit_if_in_progress", json!(false)),
        ("service_identifier_executable", Value::Null),
    ]
}

/// Assemble the service backup document
#[must_use]
#[inline]
pub fn assemble(context: &RenderContext) -> EffectiveDocument {
    let backup = context.properties.subtree(BACKUP_ROOT);
    let destinations: Vec<Value> = backup
        .get("destinations")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(destination)
        .collect();

    let mut tree = PropertyTree::new();
    tree.insert("destinations", Value::Array(destinations));
    tree.insert(
        "deployment_name",
        context.deployment.clone().map_or(Value::Null, Value::String),
    );
    for (setting, default) in settings() {
        tree.insert(setting, field_or(&backup, setting, default));
    }

    let mut document = PropertyTree::new();
    document.insert(BACKUP_ROOT, tree.into_value());
    EffectiveDocument::new(document)
}

/// Rewrite one destination; entries without a known type are skipped
fn destination(entry: &Value) -> Option<Value> {
    let kind = lookup(entry, "type")
        .and_then(Value::as_str)
        .and_then(DestinationType::from_name)?;
    let config = lookup(entry, "config");

    let value_of = |key: &str| config.and_then(|config| lookup(config, key)).cloned();

    let mut ordered = Map::new();
    let push_optional = |ordered: &mut Map<String, Value>| {
        for (key, default) in kind.optional_keys() {
            let value = value_of(key).filter(|value| !value.is_null()).unwrap_or(default);
            ordered.insert(key.to_owned(), value);
        }
    };

    if kind.optional_first() {
        push_optional(&mut ordered);
    }
    for key in kind.required_keys() {
        ordered.insert((*key).to_owned(), value_of(key).unwrap_or(Value::Null));
    }
    if !kind.optional_first() {
        push_optional(&mut ordered);
    }

    let mut rewritten = Map::new();
    rewritten.insert("type".to_owned(), json!(kind.name()));
    if let Some(name) = lookup(entry, "name").filter(|name| !name.is_null()) {
        rewritten.insert("name".to_owned(), name.clone());
    }
    rewritten.insert("config".to_owned(), Value::Object(ordered));
    Some(Value::Object(rewritten))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::job::JobKind;
    use pretty_assertions::assert_eq;

    fn context(backup: Value) -> RenderContext {
        let mut ctx = RenderContext::from_properties(
            PropertyTree::try_from(json!({"service-backup": backup})).unwrap(),
        );
        ctx.job = JobKind::ServiceBackup;
        ctx.deployment = Some("service-instance_abc".to_owned());
        ctx
    }

    #[test]
    fn s3_puts_optional_keys_first() {
        let doc = assemble(&context(json!({
            "destinations": [{"type": "s3", "name": "primary", "config": {
                "bucket_name": "b", "bucket_path": "p",
                "access_key_id": "id", "secret_access_key": "key",
                "region": "eu-west-1"
            }}]
        })));
        let config = doc.get("service-backup.destinations.0.config").unwrap();
        let keys: Vec<&String> = config.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            ["endpoint_url", "region", "bucket_name", "bucket_path", "access_key_id", "secret_access_key"]
        );
        assert_eq!(config["endpoint_url"], json!(""));
        assert_eq!(config["region"], json!("eu-west-1"));
        assert_eq!(doc.get("service-backup.destinations.0.name"), Some(&json!("primary")));
    }

    #[test]
    fn scp_and_azure_defaults() {
        let doc = assemble(&context(json!({
            "destinations": [
                {"type": "scp", "config": {"server": "s", "user": "u", "destination": "d", "key": "k"}},
                {"type": "azure", "config": {"storage_account": "a", "storage_access_key": "k", "container": "c", "path": "p"}}
            ]
        })));
        assert_eq!(doc.get("service-backup.destinations.0.config.port"), Some(&json!(22)));
        assert_eq!(doc.get("service-backup.destinations.0.config.fingerprint"), Some(&json!("")));
        assert_eq!(
            doc.get("service-backup.destinations.1.config.blob_store_base_url"),
            Some(&json!("core.windows.net"))
        );
        assert!(doc.get("service-backup.destinations.1.name").is_none());
    }

    #[test]
    fn settings_are_defaulted() {
        let doc = assemble(&context(json!({"source_folder": "/var/vcap/store"})));
        assert_eq!(doc.get("service-backup.destinations"), Some(&json!([])));
        assert_eq!(
            doc.get("service-backup.deployment_name"),
            Some(&json!("service-instance_abc"))
        );
        assert_eq!(doc.get("service-backup.source_folder"), Some(&json!("/var/vcap/store")));
        assert_eq!(doc.get("service-backup.backup_user"), Some(&json!("vcap")));
        assert_eq!(doc.get("service-backup.exit_if_in_progress"), Some(&json!(false)));
        assert_eq!(
            doc.get("service-backup.missing_properties_message"),
            Some(&json!("Provide these missing fields in your manifest."))
        );
    }
}
