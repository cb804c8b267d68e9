use async_graphql::SimpleObject;
use k8s_openapi::api::core::v1 as corev1;
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, ObjectMeta};
use crate::crossplane;
use crate::unstructured;

/// A Secret. Values are only reachable through `raw`.
#[derive(Debug, Clone, SimpleObject)]
pub struct Secret {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[graphql(name = "type")]
    pub type_: Option<String>,
    /// Keys present in `data`, sorted.
    pub data_keys: Vec<String>,
    pub raw: String,
}

impl Secret {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let s: corev1::Secret = crossplane::decode(obj, "secret")?;
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&s.metadata),
            type_: s.type_,
            data_keys: s.data.map(|d| d.into_keys().collect()).unwrap_or_default(),
            raw: raw_json(obj, "secret")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_keys_not_values() {
        let o: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "v1", "kind": "Secret",
            "metadata": { "name": "creds", "namespace": "crossplane-system" },
            "type": "Opaque",
            "data": { "password": "aHVudGVyMg==", "username": "YWRtaW4=" }
        }))
        .unwrap();
        let s = Secret::from_object(&o).unwrap();
        assert_eq!(s.id, ReferenceId::new("v1", "Secret", "crossplane-system", "creds"));
        assert_eq!(s.type_.as_deref(), Some("Opaque"));
        assert_eq!(s.data_keys, vec!["password", "username"]);
    }
}
