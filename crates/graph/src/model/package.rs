//! Crossplane packages (providers and configurations) and their revisions.

use async_graphql::{Enum, SimpleObject};
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, Condition, ObjectMeta};
use crate::crossplane::{self, TypedReference};
use crate::unstructured;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum RevisionActivationPolicy {
    Automatic,
    Manual,
}

impl From<crossplane::RevisionActivationPolicy> for RevisionActivationPolicy {
    fn from(p: crossplane::RevisionActivationPolicy) -> Self {
        match p {
            crossplane::RevisionActivationPolicy::Automatic => Self::Automatic,
            crossplane::RevisionActivationPolicy::Manual => Self::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum PackageRevisionDesiredState {
    Active,
    Inactive,
}

impl From<crossplane::PackageRevisionDesiredState> for PackageRevisionDesiredState {
    fn from(s: crossplane::PackageRevisionDesiredState) -> Self {
        match s {
            crossplane::PackageRevisionDesiredState::Active => Self::Active,
            crossplane::PackageRevisionDesiredState::Inactive => Self::Inactive,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PackageSpec {
    pub package: String,
    pub revision_activation_policy: Option<RevisionActivationPolicy>,
    pub revision_history_limit: Option<i64>,
    pub package_pull_policy: Option<String>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

impl From<crossplane::PackageSpec> for PackageSpec {
    fn from(s: crossplane::PackageSpec) -> Self {
        Self {
            package: s.package,
            revision_activation_policy: s.revision_activation_policy.map(Into::into),
            revision_history_limit: s.revision_history_limit,
            package_pull_policy: s.package_pull_policy,
            ignore_crossplane_constraints: s.ignore_crossplane_constraints,
            skip_dependency_resolution: s.skip_dependency_resolution,
        }
    }
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct PackageStatus {
    pub conditions: Vec<Condition>,
    pub current_revision: Option<String>,
    pub current_identifier: Option<String>,
}

impl From<crossplane::PackageStatus> for PackageStatus {
    fn from(s: crossplane::PackageStatus) -> Self {
        Self {
            conditions: Condition::all(&s.conditions),
            current_revision: s.current_revision,
            current_identifier: s.current_identifier,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PackageRevisionSpec {
    pub desired_state: PackageRevisionDesiredState,
    pub package: String,
    pub revision: i64,
    pub package_pull_policy: Option<String>,
    pub ignore_crossplane_constraints: Option<bool>,
    pub skip_dependency_resolution: Option<bool>,
}

impl From<crossplane::PackageRevisionSpec> for PackageRevisionSpec {
    fn from(s: crossplane::PackageRevisionSpec) -> Self {
        Self {
            desired_state: s.desired_state.into(),
            package: s.package,
            revision: s.revision,
            package_pull_policy: s.package_pull_policy,
            ignore_crossplane_constraints: s.ignore_crossplane_constraints,
            skip_dependency_resolution: s.skip_dependency_resolution,
        }
    }
}

/// Common projection of a decoded package.
struct PackageParts {
    id: ReferenceId,
    api_version: String,
    kind: String,
    metadata: ObjectMeta,
    spec: PackageSpec,
    status: Option<PackageStatus>,
    raw: String,
}

fn package_parts(obj: &DynamicObject, what: &str) -> Result<PackageParts> {
    let pkg: crossplane::Package = crossplane::decode(obj, what)?;
    Ok(PackageParts {
        id: unstructured::reference_id(obj),
        api_version: unstructured::api_version(obj).to_owned(),
        kind: unstructured::kind(obj).to_owned(),
        metadata: ObjectMeta::from(&pkg.metadata),
        spec: pkg.spec.into(),
        status: pkg.status.map(Into::into),
        raw: raw_json(obj, what)?,
    })
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Provider {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
    pub status: Option<PackageStatus>,
    pub raw: String,
}

impl Provider {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let p = package_parts(obj, "provider")?;
        Ok(Self { id: p.id, api_version: p.api_version, kind: p.kind, metadata: p.metadata, spec: p.spec, status: p.status, raw: p.raw })
    }
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Configuration {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageSpec,
    pub status: Option<PackageStatus>,
    pub raw: String,
}

impl Configuration {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let p = package_parts(obj, "configuration")?;
        Ok(Self { id: p.id, api_version: p.api_version, kind: p.kind, metadata: p.metadata, spec: p.spec, status: p.status, raw: p.raw })
    }
}

/// Status of a provider revision. `objects` resolves to the CRDs it installed.
#[derive(Debug, Clone, Default, SimpleObject)]
#[graphql(complex)]
pub struct ProviderRevisionStatus {
    pub conditions: Vec<Condition>,
    pub found_dependencies: Option<i64>,
    pub installed_dependencies: Option<i64>,
    pub invalid_dependencies: Option<i64>,
    #[graphql(skip)]
    pub object_refs: Vec<TypedReference>,
}

/// Status of a configuration revision. `objects` resolves to the XRDs and
/// compositions it installed.
#[derive(Debug, Clone, Default, SimpleObject)]
#[graphql(complex)]
pub struct ConfigurationRevisionStatus {
    pub conditions: Vec<Condition>,
    pub found_dependencies: Option<i64>,
    pub installed_dependencies: Option<i64>,
    pub invalid_dependencies: Option<i64>,
    #[graphql(skip)]
    pub object_refs: Vec<TypedReference>,
}

macro_rules! revision_status_from {
    ($t:ty) => {
        impl From<crossplane::PackageRevisionStatus> for $t {
            fn from(s: crossplane::PackageRevisionStatus) -> Self {
                Self {
                    conditions: Condition::all(&s.conditions),
                    found_dependencies: s.found_dependencies,
                    installed_dependencies: s.installed_dependencies,
                    invalid_dependencies: s.invalid_dependencies,
                    object_refs: s.object_refs,
                }
            }
        }
    };
}

revision_status_from!(ProviderRevisionStatus);
revision_status_from!(ConfigurationRevisionStatus);

#[derive(Debug, Clone, SimpleObject)]
pub struct ProviderRevision {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageRevisionSpec,
    pub status: Option<ProviderRevisionStatus>,
    pub raw: String,
}

impl ProviderRevision {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let rev: crossplane::PackageRevision = crossplane::decode(obj, "provider revision")?;
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&rev.metadata),
            spec: rev.spec.into(),
            status: rev.status.map(Into::into),
            raw: raw_json(obj, "provider revision")?,
        })
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ConfigurationRevision {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: PackageRevisionSpec,
    pub status: Option<ConfigurationRevisionStatus>,
    pub raw: String,
}

impl ConfigurationRevision {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let rev: crossplane::PackageRevision = crossplane::decode(obj, "configuration revision")?;
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&rev.metadata),
            spec: rev.spec.into(),
            status: rev.status.map(Into::into),
            raw: raw_json(obj, "configuration revision")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::Error;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> DynamicObject { serde_json::from_value(v).unwrap() }

    #[test]
    fn provider_from_object() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "Provider",
            "metadata": { "name": "provider-aws", "uid": "p-uid" },
            "spec": { "package": "xpkg.upbound.io/upbound/provider-aws:v0.47.0", "revisionActivationPolicy": "Manual" },
            "status": { "currentRevision": "provider-aws-abc", "conditions": [{ "type": "Installed", "status": "True" }] }
        }));
        let p = Provider::from_object(&o).unwrap();
        assert_eq!(p.id, ReferenceId::cluster("pkg.crossplane.io/v1", "Provider", "provider-aws"));
        assert_eq!(p.spec.revision_activation_policy, Some(RevisionActivationPolicy::Manual));
        let status = p.status.unwrap();
        assert_eq!(status.current_revision.as_deref(), Some("provider-aws-abc"));
        assert_eq!(status.conditions.len(), 1);
    }

    #[test]
    fn configuration_without_package_fails() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "Configuration",
            "metadata": { "name": "platform-ref-aws" },
            "spec": { "revisionHistoryLimit": 1 }
        }));
        assert!(matches!(Configuration::from_object(&o), Err(Error::Conversion { .. })));
    }

    #[test]
    fn revision_keeps_object_refs_for_resolution() {
        let o = obj(json!({
            "apiVersion": "pkg.crossplane.io/v1", "kind": "ConfigurationRevision",
            "metadata": { "name": "platform-ref-aws-1" },
            "spec": { "desiredState": "Inactive", "package": "p", "revision": 1 },
            "status": {
                "foundDependencies": 2,
                "objectRefs": [{ "apiVersion": "apiextensions.crossplane.io/v1", "kind": "Composition", "name": "c" }]
            }
        }));
        let rev = ConfigurationRevision::from_object(&o).unwrap();
        assert_eq!(rev.spec.desired_state, PackageRevisionDesiredState::Inactive);
        let status = rev.status.unwrap();
        assert_eq!(status.found_dependencies, Some(2));
        assert_eq!(status.object_refs.len(), 1);
    }
}
