//! Shape sniffing over untyped objects.
//!
//! Managed resources, provider configs and composite resources have no fixed
//! kind: providers and XRDs define them at runtime. The only way to tell them
//! apart is by the fields Crossplane conventionally puts on them.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kgraph_core::ReferenceId;
use kube::core::{DynamicObject, GroupVersionKind};
use serde_json::Value;

pub fn api_version(obj: &DynamicObject) -> &str { obj.types.as_ref().map_or("", |t| t.api_version.as_str()) }

pub fn kind(obj: &DynamicObject) -> &str { obj.types.as_ref().map_or("", |t| t.kind.as_str()) }

pub fn gvk(obj: &DynamicObject) -> GroupVersionKind { kgraph_kubehub::gvk_from(api_version(obj), kind(obj)) }

pub fn is_cluster_scoped(obj: &DynamicObject) -> bool { obj.metadata.namespace.as_deref().map_or(true, str::is_empty) }

/// Reference id of any object, from its type and metadata.
pub fn reference_id(obj: &DynamicObject) -> ReferenceId {
    ReferenceId::new(
        api_version(obj),
        kind(obj),
        obj.metadata.namespace.clone().unwrap_or_default(),
        obj.metadata.name.clone().unwrap_or_default(),
    )
}

/// Read-only field path access into an object's JSON (`spec.a.b`).
#[derive(Debug, Clone, Copy)]
pub struct Paved<'a>(&'a Value);

impl<'a> Paved<'a> {
    pub fn new(v: &'a Value) -> Self { Self(v) }

    pub fn of(obj: &'a DynamicObject) -> Self { Self::new(&obj.data) }

    pub fn get(&self, path: &str) -> Option<&'a Value> {
        path.split('.').try_fold(self.0, |cur, seg| cur.as_object()?.get(seg))
    }

    pub fn get_str(&self, path: &str) -> Option<&'a str> { self.get(path)?.as_str() }

    pub fn get_i64(&self, path: &str) -> Option<i64> { self.get(path)?.as_i64() }

    pub fn get_array(&self, path: &str) -> Option<&'a Vec<Value>> { self.get(path)?.as_array() }

    pub fn has(&self, path: &str) -> bool { self.get(path).map_or(false, |v| !v.is_null()) }
}

/// The owner reference marked as controller, if any.
pub fn controller_of(meta: &ObjectMeta) -> Option<&OwnerReference> {
    meta.owner_references.as_ref()?.iter().find(|r| r.controller == Some(true))
}

pub fn is_controlled_by(meta: &ObjectMeta, uid: &str) -> bool { controller_of(meta).map_or(false, |r| r.uid == uid) }

/// Cluster scoped with a provider config reference (or the legacy provider
/// reference).
pub fn probably_managed(obj: &DynamicObject) -> bool {
    let p = Paved::of(obj);
    is_cluster_scoped(obj) && (p.get_str("spec.providerConfigRef.name").is_some() || p.get_str("spec.providerRef.name").is_some())
}

/// Cluster scoped `ProviderConfig` whose usage count, when reported, is an
/// integer.
pub fn probably_provider_config(obj: &DynamicObject) -> bool {
    let p = Paved::of(obj);
    is_cluster_scoped(obj) && kind(obj) == "ProviderConfig" && (!p.has("status.users") || p.get_i64("status.users").is_some())
}

/// Cluster scoped with a composition reference or composed resource refs.
pub fn probably_composite(obj: &DynamicObject) -> bool {
    let p = Paved::of(obj);
    is_cluster_scoped(obj) && (p.get_str("spec.compositionRef.name").is_some() || p.get_array("spec.resourceRefs").is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> DynamicObject { serde_json::from_value(v).unwrap() }

    #[test]
    fn paved_walks_nested_fields() {
        let v = json!({ "spec": { "providerConfigRef": { "name": "default" }, "count": 3, "refs": [] } });
        let p = Paved::new(&v);
        assert_eq!(p.get_str("spec.providerConfigRef.name"), Some("default"));
        assert_eq!(p.get_i64("spec.count"), Some(3));
        assert!(p.get_array("spec.refs").is_some());
        assert!(p.get("spec.missing.deeper").is_none());
        assert!(p.get_str("spec.count").is_none());
    }

    #[test]
    fn data_excludes_type_and_metadata() {
        let o = obj(json!({
            "apiVersion": "s3.aws.upbound.io/v1beta1",
            "kind": "Bucket",
            "metadata": { "name": "b" },
            "spec": { "providerConfigRef": { "name": "default" } }
        }));
        assert_eq!(api_version(&o), "s3.aws.upbound.io/v1beta1");
        assert_eq!(kind(&o), "Bucket");
        assert!(Paved::of(&o).get("apiVersion").is_none());
        assert_eq!(gvk(&o).group, "s3.aws.upbound.io");
    }

    #[test]
    fn managed_needs_cluster_scope_and_provider_config_ref() {
        let mr = obj(json!({
            "apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "Bucket",
            "metadata": { "name": "b" },
            "spec": { "providerConfigRef": { "name": "default" } }
        }));
        assert!(probably_managed(&mr));

        let legacy = obj(json!({
            "apiVersion": "database.example.org/v1alpha1", "kind": "Instance",
            "metadata": { "name": "i" },
            "spec": { "providerRef": { "name": "gcp" } }
        }));
        assert!(probably_managed(&legacy));

        let namespaced = obj(json!({
            "apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "Bucket",
            "metadata": { "name": "b", "namespace": "team-a" },
            "spec": { "providerConfigRef": { "name": "default" } }
        }));
        assert!(!probably_managed(&namespaced));

        let wrong_type = obj(json!({
            "apiVersion": "s3.aws.upbound.io/v1beta1", "kind": "Bucket",
            "metadata": { "name": "b" },
            "spec": { "providerConfigRef": { "name": 7 } }
        }));
        assert!(!probably_managed(&wrong_type));
    }

    #[test]
    fn provider_config_by_kind_and_users() {
        let pc = obj(json!({
            "apiVersion": "aws.upbound.io/v1beta1", "kind": "ProviderConfig",
            "metadata": { "name": "default" },
            "status": { "users": 4 }
        }));
        assert!(probably_provider_config(&pc));
        let fresh = obj(json!({ "apiVersion": "aws.upbound.io/v1beta1", "kind": "ProviderConfig", "metadata": { "name": "default" } }));
        assert!(probably_provider_config(&fresh));
        let odd = obj(json!({
            "apiVersion": "aws.upbound.io/v1beta1", "kind": "ProviderConfig",
            "metadata": { "name": "default" },
            "status": { "users": "four" }
        }));
        assert!(!probably_provider_config(&odd));
    }

    #[test]
    fn composite_by_composition_ref_or_resource_refs() {
        let xr = obj(json!({
            "apiVersion": "example.org/v1alpha1", "kind": "XNetwork",
            "metadata": { "name": "n" },
            "spec": { "compositionRef": { "name": "xnetworks.aws" } }
        }));
        assert!(probably_composite(&xr));
        let xr = obj(json!({
            "apiVersion": "example.org/v1alpha1", "kind": "XNetwork",
            "metadata": { "name": "n" },
            "spec": { "resourceRefs": [] }
        }));
        assert!(probably_composite(&xr));
        let claim = obj(json!({
            "apiVersion": "example.org/v1alpha1", "kind": "Network",
            "metadata": { "name": "n", "namespace": "team-a" },
            "spec": { "compositionRef": { "name": "xnetworks.aws" } }
        }));
        assert!(!probably_composite(&claim));
    }

    #[test]
    fn controller_reference_matches_uid() {
        let meta: ObjectMeta = serde_json::from_value(json!({
            "name": "rev",
            "ownerReferences": [
                { "apiVersion": "v1", "kind": "Other", "name": "x", "uid": "other-uid" },
                { "apiVersion": "pkg.crossplane.io/v1", "kind": "Configuration", "name": "c", "uid": "c-uid", "controller": true }
            ]
        }))
        .unwrap();
        assert_eq!(controller_of(&meta).map(|r| r.name.as_str()), Some("c"));
        assert!(is_controlled_by(&meta, "c-uid"));
        assert!(!is_controlled_by(&meta, "other-uid"));
        assert!(!is_controlled_by(&ObjectMeta::default(), "c-uid"));
    }

    #[test]
    fn reference_id_uses_empty_namespace_for_cluster_scope() {
        let o = obj(json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider", "metadata": { "name": "provider-aws" } }));
        assert_eq!(reference_id(&o), ReferenceId::cluster("pkg.crossplane.io/v1", "Provider", "provider-aws"));
    }
}
