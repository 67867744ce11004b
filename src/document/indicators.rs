//! Indicator document
//!
//! Describes the broker's instance-count metrics for the monitoring
//! pipeline: one indicator for the whole service and one per plan, each with
//! thresholds derived from the matching instance quota.

use super::EffectiveDocument;
use crate::config::tree::{PropertyTree, lookup};
use crate::render::RenderContext;
use crate::validation::{plan_name, plans};
use serde_json::{Value, json};

/// Version reported for the indicator product
pub const PRODUCT_VERSION: &str = "1.0.0";

/// Name of the service-wide indicator
pub const GLOBAL_INDICATOR: &str = "global_total_instances";

const QUERY_LABELS: &str = r#"{deployment="$deployment",source_id="$source_id"}"#;

/// Critical and warning levels for an instance limit
///
/// The warning level is 80% of the critical one, rounded down. No limit
/// means no thresholds.
#[must_use]
#[inline]
pub fn thresholds(limit: Option<i64>) -> Vec<Value> {
    limit.map_or_else(Vec::new, |critical| {
        vec![
            json!({"level": "critical", "gte": critical}),
            json!({"level": "warning", "gte": critical.saturating_mul(4).div_euclid(5)}),
        ]
    })
}

/// Replace every character outside `[A-Za-z0-9]` with `_`
#[must_use]
#[inline]
pub fn metric_segment(name: &str) -> String {
    name.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect()
}

/// Assemble the indicator document of the broker
#[must_use]
#[inline]
pub fn assemble(context: &RenderContext) -> EffectiveDocument {
    let properties = &context.properties;
    let deployment = context.deployment.clone().unwrap_or_default();
    let service = metric_segment(properties.str("service_catalog.service_name").unwrap_or_default());

    let mut indicators = vec![json!({
        "name": GLOBAL_INDICATOR,
        "promql": format!("_on_demand_broker_{service}_total_instances{QUERY_LABELS}"),
        "thresholds": thresholds(properties.i64("service_catalog.global_quotas.service_instance_limit")),
        "documentation": {
            "title": "Total Service Instances",
            "description": "The total number of service instances deployed by the on-demand broker across all plans.",
            "thresholdNote": "The thresholds follow the global service instance limit. The warning level is 80% of the limit.",
            "recommendedResponse": "Raise the global service instance limit or remove unused service instances.",
        },
    })];

    for plan in plans(properties) {
        let name = plan_name(plan);
        let segment = metric_segment(name);
        let limit = lookup(plan, "quotas.service_instance_limit").and_then(Value::as_i64);
        indicators.push(json!({
            "name": format!("{segment}_total_instances"),
            "promql": format!("_on_demand_broker_{service}_{segment}_total_instances{QUERY_LABELS}"),
            "thresholds": thresholds(limit),
            "documentation": {
                "title": format!("{name} Instance Count"),
                "description": format!("The number of service instances of plan {name}."),
                "thresholdNote": "The thresholds follow the plan's service instance limit. The warning level is 80% of the limit.",
                "recommendedResponse": format!("Raise the service instance limit of plan {name} or remove unused service instances."),
            },
        }));
    }

    let names: Vec<Value> = indicators
        .iter()
        .filter_map(|indicator| lookup(indicator, "name").cloned())
        .collect();

    let mut tree = PropertyTree::new();
    tree.insert("apiVersion", json!("v0"));
    tree.insert(
        "product",
        json!({"name": deployment, "version": PRODUCT_VERSION}),
    );
    tree.insert(
        "metadata",
        json!({"deployment": deployment, "source_id": deployment}),
    );
    tree.insert("indicators", Value::Array(indicators));
    tree.insert(
        "layout",
        json!({
            "title": "On-Demand Broker",
            "owner": "Services",
            "description": "Service instance counts against their configured limits.",
            "sections": [{
                "title": "Service Instances",
                "description": "Instances deployed in total and per plan.",
                "indicators": names,
            }],
        }),
    );

    EffectiveDocument::new(tree)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(catalog: Value) -> RenderContext {
        let mut ctx = RenderContext::from_properties(
            PropertyTree::try_from(json!({"service_catalog": catalog})).unwrap(),
        );
        ctx.deployment = Some("my-deployment".to_owned());
        ctx
    }

    fn indicator<'d>(doc: &'d EffectiveDocument, name: &str) -> &'d Value {
        doc.get("indicators")
            .and_then(Value::as_array)
            .unwrap()
            .iter()
            .find(|indicator| indicator["name"] == name)
            .unwrap()
    }

    #[test]
    fn threshold_pairs() {
        assert_eq!(
            thresholds(Some(200)),
            vec![
                json!({"level": "critical", "gte": 200}),
                json!({"level": "warning", "gte": 160}),
            ]
        );
        assert_eq!(thresholds(Some(7))[1], json!({"level": "warning", "gte": 5}));
        assert!(thresholds(None).is_empty());
    }

    #[test]
    fn product_and_metadata() {
        let doc = assemble(&context(json!({"service_name": "redis"})));
        assert_eq!(
            doc.get("product"),
            Some(&json!({"name": "my-deployment", "version": "1.0.0"}))
        );
        assert_eq!(
            doc.get("metadata"),
            Some(&json!({"deployment": "my-deployment", "source_id": "my-deployment"}))
        );
    }

    #[test]
    fn queries_and_plan_indicators() {
        let doc = assemble(&context(json!({
            "service_name": "test-redis-broker",
            "global_quotas": {"service_instance_limit": 200},
            "plans": [
                {"name": "dedicated-vm"},
                {"name": "dedicated-high-mem-vm", "quotas": {"service_instance_limit": 10}}
            ]
        })));

        let global = indicator(&doc, "global_total_instances");
        assert_eq!(
            global["promql"],
            r#"_on_demand_broker_test_redis_broker_total_instances{deployment="$deployment",source_id="$source_id"}"#
        );
        assert_eq!(global["thresholds"][1]["gte"], 160);

        let first = indicator(&doc, "dedicated_vm_total_instances");
        assert_eq!(
            first["promql"],
            r#"_on_demand_broker_test_redis_broker_dedicated_vm_total_instances{deployment="$deployment",source_id="$source_id"}"#
        );
        assert_eq!(first["documentation"]["title"], "dedicated-vm Instance Count");
        assert_eq!(first["thresholds"], json!([]));

        let second = indicator(&doc, "dedicated_high_mem_vm_total_instances");
        assert_eq!(second["thresholds"][0]["gte"], 10);
        assert_eq!(
            doc.get("layout.sections.0.indicators"),
            Some(&json!([
                "global_total_instances",
                "dedicated_vm_total_instances",
                "dedicated_high_mem_vm_total_instances"
            ]))
        );
    }
}
