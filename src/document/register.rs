//! Register-broker errand document
//!
//! Registers the broker with Cloud Foundry and applies each plan's access
//! policy. The Cloud Foundry endpoint, the broker credentials and the plans
//! all come through the broker link.

use super::EffectiveDocument;
use super::blocks::{self, field};
use super::shell::shell_escape;
use super::url::broker_url;
use crate::canonical::BROKER_LINK;
use crate::config::tree::{PropertyTree, lookup, scalar_to_string};
use crate::error::ValidationError;
use crate::render::RenderContext;
use crate::validation::{plan_name, plans};
use serde_json::{Value, json};

/// Assemble the register-broker document
///
/// # Errors
///
/// Returns an error if the broker URL can be neither read from `broker_uri`
/// nor derived from the broker link.
#[inline]
pub fn assemble(context: &RenderContext) -> Result<EffectiveDocument, ValidationError> {
    let properties = &context.properties;
    let link = context.links.get(BROKER_LINK);
    let exported = link.map(|link| link.properties.clone()).unwrap_or_default();

    let url = broker_url(properties.str("broker_uri"), link)?;
    let plans: Vec<Value> = plans(&exported).map(plan_access).collect();

    let mut tree = PropertyTree::new();
    tree.insert("broker_name", field(properties, "broker_name"));
    tree.insert("broker_username", field(&exported, "username"));
    tree.insert("broker_password", field(&exported, "password"));
    tree.insert("broker_url", Value::String(url));
    tree.insert(
        "disable_ssl_cert_verification",
        Value::Bool(exported.bool_or("disable_ssl_cert_verification", false)),
    );
    tree.insert("cf", blocks::cf(&exported));
    tree.insert("service_name", field(&exported, "service_catalog.service_name"));
    tree.insert("plans", Value::Array(plans));
    tree.insert("shell", shell_credentials(&exported));

    Ok(EffectiveDocument::new(tree))
}

fn plan_access(plan: &Value) -> Value {
    let mut access = serde_json::Map::new();
    access.insert("name".to_owned(), json!(plan_name(plan)));
    access.insert(
        "cf_service_access".to_owned(),
        lookup(plan, "cf_service_access").cloned().unwrap_or(Value::Null),
    );
    let org = lookup(plan, "service_access_org")
        .and_then(scalar_to_string)
        .filter(|org| !org.is_empty());
    if let Some(org) = org {
        access.insert("service_access_org".to_owned(), Value::String(org));
    }
    Value::Object(access)
}

fn shell_credentials(exported: &PropertyTree) -> Value {
    let escaped = |path: &str| {
        let value = exported
            .get(path)
            .and_then(scalar_to_string)
            .unwrap_or_default();
        Value::String(shell_escape(&value))
    };

    json!({
        "cf_client_id": escaped("cf.uaa.authentication.client_credentials.client_id"),
        "cf_client_secret": escaped("cf.uaa.authentication.client_credentials.client_secret"),
        "cf_username": escaped("cf.uaa.authentication.user_credentials.username"),
        "cf_password": escaped("cf.uaa.authentication.user_credentials.password"),
        "broker_username": escaped("username"),
        "broker_password": escaped("password"),
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::config::links::{Link, ResolvedLinks};
    use crate::job::JobKind;
    use pretty_assertions::assert_eq;

    fn context(properties: Value, exported: Value) -> RenderContext {
        let link = Link::new("broker", PropertyTree::try_from(exported).unwrap())
            .with_instance_address("10.0.0.5");
        let mut ctx = RenderContext::from_properties(PropertyTree::try_from(properties).unwrap())
            .with_links(ResolvedLinks::from_iter([link]));
        ctx.job = JobKind::RegisterBroker;
        ctx
    }

    fn exported() -> Value {
        json!({
            "port": 8080,
            "username": "%username'\"t:%!",
            "password": "p'w",
            "disable_ssl_cert_verification": true,
            "cf": {
                "url": "https://api.cf",
                "uaa": {
                    "url": "https://uaa.cf",
                    "authentication": {
                        "client_credentials": {"client_id": null, "client_secret": null},
                        "user_credentials": {"username": "admin", "password": "secret"}
                    }
                }
            },
            "service_catalog": {
                "service_name": "redis",
                "plans": [
                    {"name": "small", "cf_service_access": "enable"},
                    {"name": "team", "cf_service_access": "org-restricted", "service_access_org": "acme"}
                ]
            }
        })
    }

    #[test]
    fn assembles_from_the_broker_link() {
        let doc = assemble(&context(json!({"broker_name": "redis-odb"}), exported())).unwrap();

        assert_eq!(doc.get("broker_name"), Some(&json!("redis-odb")));
        assert_eq!(doc.get("broker_url"), Some(&json!("http://10.0.0.5:8080")));
        assert_eq!(doc.get("disable_ssl_cert_verification"), Some(&json!(true)));
        assert_eq!(doc.get("service_name"), Some(&json!("redis")));
        assert_eq!(
            doc.get("cf.authentication.uaa.user_credentials.username"),
            Some(&json!("admin"))
        );
        assert_eq!(
            doc.get("plans").unwrap(),
            &json!([
                {"name": "small", "cf_service_access": "enable"},
                {"name": "team", "cf_service_access": "org-restricted", "service_access_org": "acme"}
            ])
        );
    }

    #[test]
    fn explicit_broker_uri_wins() {
        let doc = assemble(&context(
            json!({"broker_name": "b", "broker_uri": "https://broker.example.com"}),
            exported(),
        ))
        .unwrap();
        assert_eq!(doc.get("broker_url"), Some(&json!("https://broker.example.com")));
    }

    #[test]
    fn credentials_are_shell_escaped() {
        let doc = assemble(&context(json!({}), exported())).unwrap();
        assert_eq!(
            doc.get("shell.broker_username"),
            Some(&json!(r#"'%username'\''"t:%!'"#))
        );
        assert_eq!(doc.get("shell.broker_password"), Some(&json!(r"'p'\''w'")));
        assert_eq!(doc.get("shell.cf_username"), Some(&json!("'admin'")));
        assert_eq!(doc.get("shell.cf_client_id"), Some(&json!("''")));
    }
}
