use async_graphql::SimpleObject;
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, ObjectMeta};
use crate::unstructured;

/// Any object no other shape claims.
#[derive(Debug, Clone, SimpleObject)]
pub struct GenericResource {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub raw: String,
}

impl GenericResource {
    /// Only fails if the object cannot be serialized back to JSON.
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&obj.metadata),
            raw: raw_json(obj, "generic resource")?,
        })
    }
}
