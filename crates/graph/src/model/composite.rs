use std::collections::BTreeMap;

use async_graphql::{Json, SimpleObject};
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kgraph_core::{ReferenceId, Result};
use kube::core::DynamicObject;
use serde::Deserialize;

use super::common::{part, raw_json, Condition, LabelSelector, ObjectMeta, ObjectReference, SecretReference};
use crate::unstructured::{self, Paved};

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CompositeResourceSpec {
    pub composition_selector: Option<LabelSelector>,
    pub composition_ref: Option<ObjectReference>,
    pub claim_ref: Option<ObjectReference>,
    pub resource_refs: Vec<ObjectReference>,
    pub write_connection_secret_to_ref: Option<SecretReference>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CompositeResourceConnectionDetails {
    pub last_published_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CompositeResourceStatus {
    pub conditions: Vec<Condition>,
    pub connection_details: CompositeResourceConnectionDetails,
}

/// An XR: an instance of a kind defined by a CompositeResourceDefinition.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct CompositeResource {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositeResourceSpec,
    pub status: CompositeResourceStatus,
    pub raw: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Selector {
    match_labels: Option<BTreeMap<String, String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spec {
    composition_selector: Option<Selector>,
    composition_ref: Option<ObjectReference>,
    claim_ref: Option<ObjectReference>,
    #[serde(default)]
    resource_refs: Vec<ObjectReference>,
    write_connection_secret_to_ref: Option<SecretReference>,
}

impl CompositeResource {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let what = format!("composite resource {}", obj.metadata.name.as_deref().unwrap_or_default());
        let p = Paved::of(obj);
        let spec = part::<Spec>(p.get("spec"), &what, "spec")?
            .map(|s| CompositeResourceSpec {
                composition_selector: s.composition_selector.map(|sel| LabelSelector { match_labels: sel.match_labels.map(Json) }),
                composition_ref: s.composition_ref,
                claim_ref: s.claim_ref,
                resource_refs: s.resource_refs,
                write_connection_secret_to_ref: s.write_connection_secret_to_ref,
            })
            .unwrap_or_default();
        let published = part::<Time>(
            p.get("status.connectionDetails.lastPublishedTime"),
            &what,
            "status.connectionDetails.lastPublishedTime",
        )?;
        let status = CompositeResourceStatus {
            conditions: Condition::from_value(p.get("status.conditions"), &what)?,
            connection_details: CompositeResourceConnectionDetails { last_published_time: published.map(|t| t.0) },
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
