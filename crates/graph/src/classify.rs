//! Untyped object to output shape.
//!
//! Rules are tried in table order and the first match wins. The shape
//! heuristics come first: a managed resource may well share its GVK with a
//! kind we'd otherwise decode exactly, and the heuristics are what Crossplane
//! itself relies on. Anything unmatched is a [`GenericResource`].

use kgraph_core::Result;
use kube::core::DynamicObject;
use metrics::counter;
use tracing::debug;

use crate::crossplane;
use crate::model::{
    CompositeResource, CompositeResourceDefinition, Configuration, ConfigurationRevision, GenericResource,
    KubernetesResource, ManagedResource, Provider, ProviderConfig, ProviderRevision,
};
use crate::unstructured;

/// One dispatch rule: a predicate and the constructor it selects.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&DynamicObject) -> bool,
    pub model: fn(&DynamicObject) -> Result<KubernetesResource>,
}

pub static RULES: &[Rule] = &[
    Rule {
        name: "managed",
        matches: unstructured::probably_managed,
        model: |o| Ok(KubernetesResource::ManagedResource(ManagedResource::from_object(o)?)),
    },
    Rule {
        name: "provider_config",
        matches: unstructured::probably_provider_config,
        model: |o| Ok(KubernetesResource::ProviderConfig(ProviderConfig::from_object(o)?)),
    },
    Rule {
        name: "composite",
        matches: unstructured::probably_composite,
        model: |o| Ok(KubernetesResource::CompositeResource(CompositeResource::from_object(o)?)),
    },
    Rule {
        name: "provider",
        matches: |o| crossplane::PROVIDER.matches(o),
        model: |o| Ok(KubernetesResource::Provider(Provider::from_object(o)?)),
    },
    Rule {
        name: "provider_revision",
        matches: |o| crossplane::PROVIDER_REVISION.matches(o),
        model: |o| Ok(KubernetesResource::ProviderRevision(ProviderRevision::from_object(o)?)),
    },
    Rule {
        name: "configuration",
        matches: |o| crossplane::CONFIGURATION.matches(o),
        model: |o| Ok(KubernetesResource::Configuration(Configuration::from_object(o)?)),
    },
    Rule {
        name: "configuration_revision",
        matches: |o| crossplane::CONFIGURATION_REVISION.matches(o),
        model: |o| Ok(KubernetesResource::ConfigurationRevision(ConfigurationRevision::from_object(o)?)),
    },
    Rule {
        name: "composite_resource_definition",
        matches: |o| crossplane::COMPOSITE_RESOURCE_DEFINITION.matches(o),
        model: |o| Ok(KubernetesResource::CompositeResourceDefinition(CompositeResourceDefinition::from_object(o)?)),
    },
];

/// First rule matching `obj`. `None` means the object is generic.
pub fn rule_for(obj: &DynamicObject) -> Option<&'static Rule> { RULES.iter().find(|r| (r.matches)(obj)) }

pub fn classify(obj: &DynamicObject) -> Result<KubernetesResource> {
    let out = match rule_for(obj) {
        Some(rule) => {
            counter!("kgraph_classify_total", 1u64, "rule" => rule.name);
            (rule.model)(obj)?
        }
        None => {
            counter!("kgraph_classify_total", 1u64, "rule" => "generic");
            KubernetesResource::GenericResource(GenericResource::from_object(obj)?)
        }
    };
    debug!(kind = %unstructured::kind(obj), name = ?obj.metadata.name, shape = out.shape(), "classified");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::Error;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> DynamicObject { serde_json::from_value(v).unwrap() }

    #[test]
    fn rule_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "managed",
                "provider_config",
                "composite",
                "provider",
                "provider_revision",
                "configuration",
                "configuration_revision",
                "composite_resource_definition",
            ]
        );
    }

    #[test]
    fn heuristics_win_over_exact_kind() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider",
            "metadata": { "name": "odd" },
            "spec": { "providerConfigRef": { "name": "default" } }
        }));
        assert!(matches!(classify(&o).unwrap(), KubernetesResource::ManagedResource(_)));
    }

    #[test]
    fn each_shape() {
        let cases = [
            (json!({ "apiVersion": "aws.upbound.io/v1beta1", "kind": "ProviderConfig", "metadata": { "name": "default" } }), "ProviderConfig"),
            (json!({ "apiVersion": "example.org/v1alpha1", "kind": "XNetwork", "metadata": { "name": "n" }, "spec": { "resourceRefs": [] } }), "CompositeResource"),
            (json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider", "metadata": { "name": "p" }, "spec": { "package": "x" } }), "Provider"),
            (json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "ProviderRevision", "metadata": { "name": "p-1" }, "spec": { "desiredState": "Active", "package": "x", "revision": 1 } }), "ProviderRevision"),
            (json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "Configuration", "metadata": { "name": "c" }, "spec": { "package": "x" } }), "Configuration"),
            (json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "ConfigurationRevision", "metadata": { "name": "c-1" }, "spec": { "desiredState": "Inactive", "package": "x", "revision": 1 } }), "ConfigurationRevision"),
            (json!({ "apiVersion": "apiextensions.crossplane.io/v1", "kind": "CompositeResourceDefinition", "metadata": { "name": "xnetworks.example.org" }, "spec": { "group": "example.org", "names": { "kind": "XNetwork", "plural": "xnetworks" } } }), "CompositeResourceDefinition"),
            (json!({ "apiVersion": "v1", "kind": "ConfigMap", "metadata": { "name": "cm", "namespace": "default" }, "data": {} }), "GenericResource"),
        ];
        for (v, shape) in cases {
            let r = classify(&obj(v)).unwrap();
            assert_eq!(r.shape(), shape);
        }
    }

    #[test]
    fn namespaced_claim_is_generic() {
        let o = obj(json!({
            "apiVersion": "example.org/v1alpha1", "kind": "Network",
            "metadata": { "name": "net", "namespace": "team-a" },
            "spec": { "compositionRef": { "name": "xnetworks.aws" } }
        }));
        assert!(rule_for(&o).is_none());
        assert!(matches!(classify(&o).unwrap(), KubernetesResource::GenericResource(_)));
    }

    #[test]
    fn exact_match_that_fails_decoding_does_not_fall_back() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "Configuration",
            "metadata": { "name": "c" },
            "spec": { "package": 42 }
        }));
        assert_eq!(rule_for(&o).map(|r| r.name), Some("configuration"));
        match classify(&o) {
            Err(Error::Conversion { what, .. }) => assert_eq!(what, "configuration c"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn id_follows_object() {
        let o = obj(json!({ "apiVersion": "v1", "kind": "ConfigMap", "metadata": { "name": "cm", "namespace": "default" } }));
        let r = classify(&o).unwrap();
        assert_eq!(r.id().namespace, "default");
        assert_eq!(r.id().encode(), kgraph_core::ReferenceId::new("v1", "ConfigMap", "default", "cm").encode());
    }
}
