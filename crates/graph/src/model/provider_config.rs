use async_graphql::SimpleObject;
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, Condition, ObjectMeta};
use crate::unstructured::{self, Paved};

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct ProviderConfigStatus {
    pub conditions: Vec<Condition>,
    /// Number of managed resources using this config.
    pub users: Option<i64>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ProviderConfig {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub status: Option<ProviderConfigStatus>,
    pub raw: String,
}

impl ProviderConfig {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let what = format!("provider config {}", obj.metadata.name.as_deref().unwrap_or_default());
        let p = Paved::of(obj);
        let status = match p.get("status") {
            Some(_) => Some(ProviderConfigStatus {
                conditions: Condition::from_value(p.get("status.conditions"), &what)?,
                users: p.get_i64("status.users"),
            }),
            None => None,
        };
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&obj.metadata),
            status,
            raw: raw_json(obj, &what)?,
        })
    }
}
