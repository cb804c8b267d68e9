use async_graphql::{Enum, SimpleObject};
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;
use serde::Deserialize;

use super::common::{part, raw_json, Condition, ObjectMeta, SecretReference};
use crate::unstructured::{self, Paved};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Deserialize)]
pub enum DeletionPolicy {
    Delete,
    Orphan,
}

#[derive(Debug, Clone, PartialEq, Eq, SimpleObject, Deserialize)]
pub struct ProviderConfigReference {
    pub name: String,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct ManagedResourceSpec {
    pub provider_config_ref: Option<ProviderConfigReference>,
    pub deletion_policy: Option<DeletionPolicy>,
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct ManagedResourceStatus {
    pub conditions: Vec<Condition>,
}

/// A resource reconciled by a provider: cloud infrastructure, usually.
#[derive(Debug, Clone, SimpleObject)]
pub struct ManagedResource {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: ManagedResourceSpec,
    pub status: Option<ManagedResourceStatus>,
    pub raw: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spec {
    provider_config_ref: Option<ProviderConfigReference>,
    provider_ref: Option<ProviderConfigReference>,
    deletion_policy: Option<DeletionPolicy>,
    write_connection_secret_to_ref: Option<SecretReference>,
}

impl ManagedResource {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let what = format!("managed resource {}", obj.metadata.name.as_deref().unwrap_or_default());
        let p = Paved::of(obj);
        let spec = part::<Spec>(p.get("spec"), &what, "spec")?
            .map(|s| ManagedResourceSpec {
                provider_config_ref: s.provider_config_ref.or(s.provider_ref),
                deletion_policy: s.deletion_policy,
                write_connection_secret_to_ref: s.write_connection_secret_to_ref,
            })
            .unwrap_or_default();
        let status = match p.get("status") {
            Some(_) => Some(ManagedResourceStatus { conditions: Condition::from_value(p.get("status.conditions"), &what)? }),
            None => None,
        };
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&obj.metadata),
            spec,
            status,
            raw: raw_json(obj, &what)?,
        })
    }
}
