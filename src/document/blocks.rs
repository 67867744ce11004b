//! Output blocks shared by several job documents
//!
//! The broker and the errands describe the BOSH director and Cloud Foundry
//! the same way, so the shapes are built in one place.

use crate::config::tree::PropertyTree;
use serde_json::{Value, json};

/// Clone of the value at `path`, nil when absent
#[must_use]
#[inline]
pub fn field(tree: &PropertyTree, path: &str) -> Value {
    tree.get(path).cloned().unwrap_or(Value::Null)
}

/// Value at `path`, `default` when absent or nil
#[must_use]
#[inline]
pub fn field_or(tree: &PropertyTree, path: &str, default: Value) -> Value {
    match tree.get(path) {
        None | Some(&Value::Null) => default,
        Some(value) => value.clone(),
    }
}

/// BOSH director endpoint with both credential flavours
///
/// The input keeps UAA client credentials flat under
/// `bosh.authentication.uaa`; the output nests them under
/// `client_credentials`.
#[must_use]
#[inline]
pub fn bosh(tree: &PropertyTree) -> Value {
    json!({
        "url": field(tree, "bosh.url"),
        "root_ca_cert": field(tree, "bosh.root_ca_cert"),
        "authentication": {
            "basic": {
                "username": field(tree, "bosh.authentication.basic.username"),
                "password": field(tree, "bosh.authentication.basic.password"),
            },
            "uaa": {
                "client_credentials": {
                    "client_id": field(tree, "bosh.authentication.uaa.client_id"),
                    "client_secret": field(tree, "bosh.authentication.uaa.client_secret"),
                },
            },
        },
    })
}

/// Cloud Foundry endpoint in the shape the broker and registrar consume
///
/// Expects the canonical `cf.uaa` block.
#[must_use]
#[inline]
pub fn cf(tree: &PropertyTree) -> Value {
    json!({
        "url": field(tree, "cf.url"),
        "root_ca_cert": field(tree, "cf.root_ca_cert"),
        "authentication": {
            "uaa": {
                "url": field(tree, "cf.uaa.url"),
                "client_credentials": {
                    "client_id": field(tree, "cf.uaa.authentication.client_credentials.client_id"),
                    "client_secret": field(tree, "cf.uaa.authentication.client_credentials.client_secret"),
                },
                "user_credentials": {
                    "username": field(tree, "cf.uaa.authentication.user_credentials.username"),
                    "password": field(tree, "cf.uaa.authentication.user_credentials.password"),
                },
            },
        },
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bosh_nests_uaa_client_credentials() {
        let tree = PropertyTree::try_from(json!({"bosh": {
            "url": "https://bosh.example.com:25555",
            "authentication": {"uaa": {"client_id": "admin", "client_secret": "secret"}}
        }}))
        .unwrap();
        assert_eq!(
            bosh(&tree),
            json!({
                "url": "https://bosh.example.com:25555",
                "root_ca_cert": null,
                "authentication": {
                    "basic": {"username": null, "password": null},
                    "uaa": {"client_credentials": {"client_id": "admin", "client_secret": "secret"}}
                }
            })
        );
    }

    #[test]
    fn field_or_replaces_nil() {
        let tree = PropertyTree::try_from(json!({"a": null, "b": false})).unwrap();
        assert_eq!(field_or(&tree, "a", json!(60)), json!(60));
        assert_eq!(field_or(&tree, "b", json!(true)), json!(false));
        assert_eq!(field_or(&tree, "c", json!("")), json!(""));
    }
}
