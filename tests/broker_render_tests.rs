//! End-to-end broker renders against the shipped job specification

use odb_config::config::Manifest;
use odb_config::config::yaml::{load_job_spec, parse_manifest};
use odb_config::document::EffectiveDocument;
use odb_config::error::{ErrorKind, ValidationError};
use odb_config::job::JobKind;
use odb_config::render::{RenderRequest, render, render_indicators};
use odb_config::system::RealSystem;
use odb_config::validation::deployment::VERSION_PINNING_MESSAGE;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;

fn fixture(name: &str) -> String {
    fs::read_to_string(format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))).unwrap()
}

fn manifest() -> Manifest {
    parse_manifest(&fixture("broker.yml")).unwrap()
}

fn render_broker(manifest: &Manifest) -> Result<EffectiveDocument, ValidationError> {
    let spec_path = format!("{}/jobs/broker/spec.yml", env!("CARGO_MANIFEST_DIR"));
    let spec = load_job_spec(&RealSystem::new(), &spec_path).unwrap();
    render(&RenderRequest {
        job: JobKind::Broker,
        manifest,
        spec: &spec,
        links: &[],
    })
}

fn with(mut manifest: Manifest, path: &str, value: Value) -> Manifest {
    manifest.properties.insert(path, value);
    manifest
}

fn without(mut manifest: Manifest, path: &str) -> Manifest {
    manifest.properties.remove(path);
    manifest
}

#[test]
fn test_valid_manifest_renders() {
    let doc = render_broker(&manifest()).unwrap();

    assert_eq!(doc.get("port"), Some(&json!(8080)));
    assert_eq!(doc.get("use_stdin"), Some(&json!(true)));
    assert_eq!(doc.get("disable_ssl_cert_verification"), Some(&json!(true)));
    assert_eq!(
        doc.get("service_adapter.path"),
        Some(&json!("/var/vcap/packages/redis-adapter/bin/service-adapter"))
    );
    assert_eq!(
        doc.get("bosh.authentication.uaa.client_credentials"),
        Some(&json!({"client_id": "odb", "client_secret": "odb-secret"}))
    );
    assert_eq!(
        doc.get("cf.authentication.uaa"),
        Some(&json!({
            "url": "https://uaa.sys.example.com",
            "client_credentials": {"client_id": null, "client_secret": null},
            "user_credentials": {"username": "admin", "password": "admin-secret"}
        }))
    );
    assert_eq!(
        doc.get("service_catalog.plans.0.cf_service_access"),
        Some(&json!("enable"))
    );
    assert!(doc.get("secure_binding_credentials").is_none());
    assert!(doc.get("credhub").is_none());
}

#[test]
fn test_undeclared_properties_are_dropped() {
    let doc = render_broker(&with(manifest(), "not_a_property", json!("x"))).unwrap();
    assert!(doc.get("not_a_property").is_none());
}

#[test]
fn test_null_manifest_value_takes_default() {
    let doc = render_broker(&with(manifest(), "port", Value::Null)).unwrap();
    assert_eq!(doc.get("port"), Some(&json!(8080)));

    let doc = render_broker(&with(manifest(), "use_stdin", json!(false))).unwrap();
    assert_eq!(doc.get("use_stdin"), Some(&json!(false)));
}

#[test]
fn test_bosh_authentication_is_required() {
    let err = render_broker(&without(manifest(), "bosh.authentication.uaa")).unwrap_err();
    assert_eq!(err.to_string(), "Invalid bosh config - must specify authentication");
    assert_eq!(err.kind(), ErrorKind::MissingField);
}

#[test]
fn test_bosh_authentication_is_exclusive() {
    let err = render_broker(&with(
        manifest(),
        "bosh.authentication.basic",
        json!({"username": "admin", "password": "pw"}),
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid bosh config - must only specify one type of authentication"
    );
    assert_eq!(err.kind(), ErrorKind::ConflictingConfig);
}

#[test]
fn test_cf_authentication_and_uaa_conflict() {
    let err = render_broker(&with(
        manifest(),
        "cf.uaa",
        json!({"url": "https://uaa", "authentication": {"client_credentials": {"client_id": "c"}}}),
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid CF config - must specify either cf.authentication or cf.uaa, not both"
    );
}

#[test]
fn test_cf_credentials_are_exclusive() {
    let err = render_broker(&with(
        manifest(),
        "cf.authentication.client_credentials",
        json!({"client_id": "c", "secret": "s"}),
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid CF authentication config - must specify either client or user credentials"
    );
}

#[test]
fn test_floating_versions_are_rejected() {
    let err = render_broker(&with(
        manifest(),
        "service_deployment.stemcells",
        json!([{"os": "ubuntu-jammy", "version": "1.latest"}]),
    ))
    .unwrap_err();
    assert_eq!(err.to_string(), VERSION_PINNING_MESSAGE);
    assert_eq!(err.kind(), ErrorKind::InvalidVersion);
}

#[test]
fn test_stemcell_is_migrated() {
    let manifest = with(
        without(manifest(), "service_deployment.stemcells"),
        "service_deployment.stemcell",
        json!({"os": "ubuntu-jammy", "version": "1.404"}),
    );
    let doc = render_broker(&manifest).unwrap();
    assert_eq!(
        doc.get("service_deployment.stemcells"),
        Some(&json!([{"os": "ubuntu-jammy", "version": "1.404"}]))
    );
    assert!(doc.get("service_deployment.stemcell").is_none());
}

#[test]
fn test_unknown_service_access_is_rejected() {
    let err = render_broker(&with(
        manifest(),
        "service_catalog.plans.0.cf_service_access",
        json!("banana"),
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Unsupported value 'banana' for cf_service_access. Choose from "enable", "disable", "manual", "org-restricted""#
    );
}

#[test]
fn test_instance_group_fields_are_required() {
    let err = render_broker(&without(
        manifest(),
        "service_catalog.plans.0.instance_groups.0.vm_type",
    ))
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid instance group config - must specify vm_type"
    );
}

#[test]
fn test_secure_binding_requires_credhub_link() {
    let manifest = with(
        manifest(),
        "secure_binding_credentials",
        json!({"enabled": true, "authentication": {"uaa": {"client_id": "c", "client_secret": "s"}}}),
    );
    let err = render_broker(&manifest).unwrap_err();
    assert_eq!(
        err.to_string(),
        "secure_binding_credentials is enabled, but no CredHub link was provided"
    );
}

#[test]
fn test_quota_resource_limits_are_folded() {
    let manifest = with(
        manifest(),
        "service_catalog.plans.0.quotas.resource_costs",
        json!({"memory": 4}),
    );
    let doc = render_broker(&manifest).unwrap();
    assert_eq!(
        doc.get("service_catalog.plans.0.quotas.resources.memory"),
        Some(&json!({"cost": 4}))
    );
}

#[test]
fn test_all_nil_plans_are_missing() {
    let err = render_broker(&with(manifest(), "service_catalog.plans", json!([null, null])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingField);
    assert_eq!(
        err.to_string(),
        "Invalid service_catalog config - must specify plans"
    );
}

#[test]
fn test_nil_plans_render_like_their_absence() {
    let base = manifest();
    let plan = base.properties.get("service_catalog.plans.0").unwrap().clone();

    let padded = render_broker(&with(
        base.clone(),
        "service_catalog.plans",
        json!([null, plan.clone(), null]),
    ))
    .unwrap();
    let single = render_broker(&with(base, "service_catalog.plans", json!([plan]))).unwrap();

    assert_eq!(padded, single);
    assert_eq!(
        padded.get("service_catalog.plans").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[test]
fn test_indicators() {
    let spec_path = format!("{}/jobs/broker/spec.yml", env!("CARGO_MANIFEST_DIR"));
    let spec = load_job_spec(&RealSystem::new(), &spec_path).unwrap();
    let manifest = manifest();
    let doc = render_indicators(&RenderRequest {
        job: JobKind::Broker,
        manifest: &manifest,
        spec: &spec,
        links: &[],
    })
    .unwrap();

    assert_eq!(
        doc.get("product"),
        Some(&json!({"name": "redis-on-demand-broker", "version": "1.0.0"}))
    );
    assert_eq!(
        doc.get("indicators.0.thresholds"),
        Some(&json!([
            {"level": "critical", "gte": 200},
            {"level": "warning", "gte": 160}
        ]))
    );
    assert_eq!(doc.get("indicators.1.name"), Some(&json!("dedicated_vm_total_instances")));
    assert_eq!(
        doc.get("indicators.1.promql"),
        Some(&json!(
            r#"_on_demand_broker_redis_on_demand_dedicated_vm_total_instances{deployment="$deployment",source_id="$source_id"}"#
        ))
    );
}
