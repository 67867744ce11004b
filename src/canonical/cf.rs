//! CF authentication block migration
//!
//! The deprecated shape keeps the UAA settings flat under
//! `cf.authentication` (`url`, `client_credentials.{client_id,secret}`,
//! `user_credentials`). The canonical shape nests them under
//! `cf.uaa.{url, authentication.{client_credentials, user_credentials}}`.
//! Only one of the two containers may be populated.

use crate::canonical::BROKER_LINK;
use crate::config::tree::{PropertyTree, has_content, lookup};
use crate::error::ValidationError;
use crate::render::RenderContext;
use serde_json::{Value, json};

/// Canonicalize the job's own `cf` block
///
/// # Errors
///
/// Returns [`ValidationError::ConflictingConfig`] when both containers are populated.
#[inline]
pub fn cf(context: &mut RenderContext) -> Result<(), ValidationError> {
    canonicalize_cf(&mut context.properties)
}

/// Canonicalize the `cf` block exported through the broker link
///
/// # Errors
///
/// Returns [`ValidationError::ConflictingConfig`] when both containers are populated.
#[inline]
pub fn broker_link_cf(context: &mut RenderContext) -> Result<(), ValidationError> {
    match context.links.properties_mut(BROKER_LINK) {
        Some(properties) => canonicalize_cf(properties),
        None => Ok(()),
    }
}

/// Rewrite `cf.authentication` into `cf.uaa` within `tree`
///
/// # Errors
///
/// Returns [`ValidationError::ConflictingConfig`] when both containers are populated.
#[inline]
pub fn canonicalize_cf(tree: &mut PropertyTree) -> Result<(), ValidationError> {
    let Some(cf) = tree.get_mut("cf").and_then(Value::as_object_mut) else {
        return Ok(());
    };

    let deprecated = cf.get("authentication").cloned().unwrap_or(Value::Null);
    let canonical = cf.get("uaa").cloned().unwrap_or(Value::Null);

    let uaa = match (has_content(&deprecated), has_content(&canonical)) {
        (true, true) => {
            return Err(ValidationError::conflicting(
                "Invalid CF config - must specify either cf.authentication or cf.uaa, not both",
            ));
        }
        (true, false) => uaa_block(
            lookup(&deprecated, "url"),
            lookup(&deprecated, "client_credentials"),
            lookup(&deprecated, "user_credentials"),
        ),
        (false, _) => uaa_block(
            lookup(&canonical, "url"),
            lookup(&canonical, "authentication.client_credentials"),
            lookup(&canonical, "authentication.user_credentials"),
        ),
    };

    cf.shift_remove("authentication");
    cf.insert("uaa".to_owned(), uaa);
    Ok(())
}

fn uaa_block(
    url: Option<&Value>,
    client_credentials: Option<&Value>,
    user_credentials: Option<&Value>,
) -> Value {
    let field = |source: Option<&Value>, key: &str| {
        source
            .and_then(|value| lookup(value, key))
            .cloned()
            .unwrap_or(Value::Null)
    };

    let client_secret = match field(client_credentials, "client_secret") {
        Value::Null => field(client_credentials, "secret"),
        secret @ (Value::Bool(_)
        | Value::Number(_)
        | Value::String(_)
        | Value::Array(_)
        | Value::Object(_)) => secret,
    };

    json!({
        "url": url.cloned().unwrap_or(Value::Null),
        "authentication": {
            "client_credentials": {
                "client_id": field(client_credentials, "client_id"),
                "client_secret": client_secret,
            },
            "user_credentials": {
                "username": field(user_credentials, "username"),
                "password": field(user_credentials, "password"),
            },
        },
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tree(value: Value) -> PropertyTree {
        PropertyTree::try_from(value).unwrap()
    }

    #[test]
    fn deprecated_block_moves_under_uaa() {
        let mut t = tree(json!({"cf": {
            "url": "https://api.cf-app.com",
            "authentication": {
                "url": "https://uaa.cf-app.com",
                "client_credentials": {"client_id": "id", "secret": "s"},
                "user_credentials": {"username": "u", "password": "p"}
            }
        }}));
        canonicalize_cf(&mut t).unwrap();
        assert_eq!(
            t.get("cf").unwrap(),
            &json!({
                "url": "https://api.cf-app.com",
                "uaa": {
                    "url": "https://uaa.cf-app.com",
                    "authentication": {
                        "client_credentials": {"client_id": "id", "client_secret": "s"},
                        "user_credentials": {"username": "u", "password": "p"}
                    }
                }
            })
        );
    }

    #[test]
    fn canonical_block_is_filled_out() {
        let mut t = tree(json!({"cf": {"uaa": {"url": "u", "authentication": {"client_credentials": {"client_id": "id", "client_secret": "s"}}}}}));
        canonicalize_cf(&mut t).unwrap();
        assert_eq!(t.str("cf.uaa.authentication.client_credentials.client_secret"), Some("s"));
        assert_eq!(t.get("cf.uaa.authentication.user_credentials.username"), Some(&Value::Null));
        assert!(!t.contains("cf.authentication"));
    }

    #[test]
    fn both_containers_conflict() {
        let mut t = tree(json!({"cf": {
            "authentication": {"url": "a"},
            "uaa": {"url": "b"}
        }}));
        assert_eq!(
            canonicalize_cf(&mut t).unwrap_err().to_string(),
            "Invalid CF config - must specify either cf.authentication or cf.uaa, not both"
        );
    }

    #[test]
    fn empty_deprecated_container_is_ignored() {
        let mut t = tree(json!({"cf": {
            "authentication": {"url": null, "client_credentials": {"client_id": ""}},
            "uaa": {"url": "b"}
        }}));
        canonicalize_cf(&mut t).unwrap();
        assert_eq!(t.str("cf.uaa.url"), Some("b"));
    }
}
