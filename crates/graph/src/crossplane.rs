//! Typed views of the Crossplane package and extension kinds.
//!
//! These kinds have a fixed schema, so unlike managed or composite resources
//! they are decoded into concrete shapes before modeling. Fields marked as
//! required here must be present with the right type or decoding fails.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kgraph_core::{Error, Result};
use kube::core::{DynamicObject, GroupVersionKind};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::unstructured;

/// A group/version/kind known ahead of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownKind {
    pub group: &'static str,
    pub version: &'static str,
    pub kind: &'static str,
}

impl KnownKind {
    pub fn gvk(&self) -> GroupVersionKind { GroupVersionKind::gvk(self.group, self.version, self.kind) }

    pub fn api_version(&self) -> String { kgraph_kubehub::api_version(&self.gvk()) }

    /// Exact apiVersion and kind match.
    pub fn matches(&self, obj: &DynamicObject) -> bool {
        unstructured::kind(obj) == self.kind && unstructured::api_version(obj) == self.api_version()
    }
}

pub const PKG_GROUP: &str = "pkg.crossplane.io";
pub const EXT_GROUP: &str = "apiextensions.crossplane.io";

pub const PROVIDER: KnownKind = KnownKind { group: PKG_GROUP, version: "v1", kind: "Provider" };
pub const PROVIDER_REVISION: KnownKind = KnownKind { group: PKG_GROUP, version: "v1", kind: "ProviderRevision" };
pub const CONFIGURATION: KnownKind = KnownKind { group: PKG_GROUP, version: "v1", kind: "Configuration" };
pub const CONFIGURATION_REVISION: KnownKind = KnownKind { group: PKG_GROUP, version: "v1", kind: "ConfigurationRevision" };
pub const COMPOSITE_RESOURCE_DEFINITION: KnownKind =
    KnownKind { group: EXT_GROUP, version: "v1", kind: "CompositeResourceDefinition" };
pub const COMPOSITION: KnownKind = KnownKind { group: EXT_GROUP, version: "v1", kind: "Composition" };

/// Group of the Kubernetes CustomResourceDefinition kind.
pub const K8S_EXT_GROUP: &str = "apiextensions.k8s.io";

pub const CUSTOM_RESOURCE_DEFINITION: KnownKind =
    KnownKind { group: K8S_EXT_GROUP, version: "v1", kind: "CustomResourceDefinition" };
pub const SECRET: KnownKind = KnownKind { group: "", version: "v1", kind: "Secret" };

/// Decode an untyped object into `T`. Missing required fields and type
/// mismatches are conversion errors.
pub fn decode<T: DeserializeOwned>(obj: &DynamicObject, what: &str) -> Result<T> {
    let value = serde_json::to_value(obj).map_err(|e| Error::conversion(what, e))?;
    serde_json::from_value(value).map_err(|e| Error::conversion(format!("{what} {}", name_of(obj)), e))
}

fn name_of(obj: &DynamicObject) -> &str { obj.metadata.name.as_deref().unwrap_or("<unnamed>") }

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub last_transition_time: Option<Time>,
    pub reason: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RevisionActivationPolicy {
    Automatic,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PackageRevisionDesiredState {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub package: String,
    pub revision_activation_policy: Option<RevisionActivationPolicy>,
    pub revision_history_limit: Option<i64>,
    pub package_pull_policy: Option<String>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub current_revision: Option<String>,
    pub current_identifier: Option<String>,
}

/// Provider and Configuration share a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct Package {
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
    #[serde(default)]
    pub status: Option<PackageStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRevisionSpec {
    pub desired_state: PackageRevisionDesiredState,
    pub package: String,
    pub revision: i64,
    pub package_pull_policy: Option<String>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: Option<String>,
}

impl TypedReference {
    pub fn group(&self) -> &str { kgraph_kubehub::parse_api_version(&self.api_version).0 }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageRevisionStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub object_refs: Vec<TypedReference>,
    pub found_dependencies: Option<i64>,
    pub installed_dependencies: Option<i64>,
    pub invalid_dependencies: Option<i64>,
}

/// ProviderRevision and ConfigurationRevision share a schema.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageRevision {
    pub metadata: ObjectMeta,
    pub spec: PackageRevisionSpec,
    #[serde(default)]
    pub status: Option<PackageRevisionStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Names {
    pub plural: String,
    pub singular: Option<String>,
    pub short_names: Option<Vec<String>>,
    pub kind: String,
    pub list_kind: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeRef {
    pub api_version: String,
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaValidation {
    #[serde(rename = "openAPIV3Schema")]
    pub open_api_v3_schema: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XrdVersion {
    pub name: String,
    pub referenceable: bool,
    pub served: bool,
    pub schema: Option<SchemaValidation>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrdSpec {
    pub group: String,
    pub names: Names,
    pub claim_names: Option<Names>,
    pub connection_secret_keys: Option<Vec<String>>,
    pub default_composition_ref: Option<NameRef>,
    pub enforced_composition_ref: Option<NameRef>,
    #[serde(default)]
    pub versions: Vec<XrdVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XrdControllers {
    pub composite_resource_type: Option<TypeRef>,
    pub composite_resource_claim_type: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrdStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub controllers: Option<XrdControllers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompositeResourceDefinition {
    pub metadata: ObjectMeta,
    pub spec: XrdSpec,
    #[serde(default)]
    pub status: Option<XrdStatus>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionSpec {
    pub composite_type_ref: TypeRef,
    pub write_connection_secrets_to_namespace: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Composition {
    pub metadata: ObjectMeta,
    pub spec: CompositionSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrdVersion {
    pub name: String,
    pub served: bool,
    pub schema: Option<SchemaValidation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrdSpec {
    pub group: String,
    pub names: Names,
    pub scope: String,
    pub versions: Vec<CrdVersion>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrdStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// The subset of `apiextensions.k8s.io/v1` CustomResourceDefinition that is
/// modeled. Unlike the generated k8s-openapi type, a missing `group`,
/// `names` or `scope` fails to decode instead of defaulting to empty.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomResourceDefinition {
    pub metadata: ObjectMeta,
    pub spec: CrdSpec,
    #[serde(default)]
    pub status: Option<CrdStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> DynamicObject { serde_json::from_value(v).unwrap() }

    #[test]
    fn known_kind_matches_exact_api_version() {
        let p = obj(json!({ "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider", "metadata": { "name": "p" } }));
        assert!(PROVIDER.matches(&p));
        assert!(!CONFIGURATION.matches(&p));
        let beta = obj(json!({ "apiVersion": "pkg.crossplane.io/v1beta1", "kind": "Provider", "metadata": { "name": "p" } }));
        assert!(!PROVIDER.matches(&beta));
    }

    #[test]
    fn decodes_package_revision() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "ConfigurationRevision",
            "metadata": { "name": "platform-ref-aws-1234" },
            "spec": { "desiredState": "Active", "package": "xpkg.upbound.io/upbound/platform-ref-aws:v0.9.0", "revision": 2 },
            "status": {
                "conditions": [{ "type": "Healthy", "status": "True", "lastTransitionTime": "2024-01-02T03:04:05Z", "reason": "HealthyPackageRevision" }],
                "objectRefs": [{ "apiVersion": "apiextensions.crossplane.io/v1", "kind": "Composition", "name": "xnetworks.aws" }]
            }
        }));
        let rev: PackageRevision = decode(&o, "configuration revision").unwrap();
        assert_eq!(rev.spec.desired_state, PackageRevisionDesiredState::Active);
        assert_eq!(rev.spec.revision, 2);
        let status = rev.status.unwrap();
        assert_eq!(status.conditions[0].reason.as_deref(), Some("HealthyPackageRevision"));
        assert_eq!(status.object_refs[0].group(), EXT_GROUP);
    }

    #[test]
    fn missing_required_field_is_conversion_error() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider",
            "metadata": { "name": "provider-aws" },
            "spec": {}
        }));
        let err = decode::<Package>(&o, "provider").unwrap_err();
        match err {
            Error::Conversion { what, reason } => {
                assert_eq!(what, "provider provider-aws");
                assert!(reason.contains("package"), "{reason}");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn wrong_type_is_conversion_error() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "ProviderRevision",
            "metadata": { "name": "provider-aws-abc" },
            "spec": { "desiredState": "Active", "package": "p", "revision": "two" }
        }));
        assert!(matches!(decode::<PackageRevision>(&o, "provider revision"), Err(Error::Conversion { .. })));
    }

    #[test]
    fn crd_without_names_or_spec_does_not_decode() {
        let no_names = obj(json!({
            "apiVersion": "apiextensions.k8s.io/v1", "kind": "CustomResourceDefinition",
            "metadata": { "name": "broken.example.org" },
            "spec": { "group": "example.org", "scope": "Cluster", "versions": [] }
        }));
        let err = decode::<CustomResourceDefinition>(&no_names, "custom resource definition").unwrap_err();
        assert!(matches!(&err, Error::Conversion { reason, .. } if reason.contains("names")), "{err:?}");

        let no_spec = obj(json!({
            "apiVersion": "apiextensions.k8s.io/v1", "kind": "CustomResourceDefinition",
            "metadata": { "name": "bare.example.org" }
        }));
        assert!(matches!(decode::<CustomResourceDefinition>(&no_spec, "custom resource definition"), Err(Error::Conversion { .. })));
    }
}
