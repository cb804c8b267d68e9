use std::collections::BTreeMap;

use async_graphql::{Enum, Json, SimpleObject};
use chrono::{DateTime, Utc};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kgraph_core::{Error, Result};
use kube::core::DynamicObject;
use serde::Deserialize;
use serde_json::Value;

use crate::crossplane;

/// Verbatim JSON of the backend object, for fields the schema doesn't model.
pub fn raw_json(obj: &DynamicObject, what: &str) -> Result<String> {
    serde_json::to_string(obj).map_err(|e| Error::modeling(what, format!("cannot marshal JSON: {e}")))
}

#[derive(Debug, Clone, SimpleObject)]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub uid: String,
    pub controller: Option<bool>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct ObjectMeta {
    pub name: Option<String>,
    pub generate_name: Option<String>,
    pub namespace: Option<String>,
    pub uid: Option<String>,
    pub resource_version: Option<String>,
    pub generation: Option<i64>,
    pub creation_time: Option<DateTime<Utc>>,
    pub deletion_time: Option<DateTime<Utc>>,
    pub labels: Option<Json<BTreeMap<String, String>>>,
    pub annotations: Option<Json<BTreeMap<String, String>>>,
    pub owner_references: Vec<OwnerReference>,
}

impl From<&metav1::ObjectMeta> for ObjectMeta {
    fn from(m: &metav1::ObjectMeta) -> Self {
        Self {
            name: m.name.clone(),
            generate_name: m.generate_name.clone(),
            namespace: m.namespace.clone(),
            uid: m.uid.clone(),
            resource_version: m.resource_version.clone(),
            generation: m.generation,
            creation_time: m.creation_timestamp.as_ref().map(|t| t.0),
            deletion_time: m.deletion_timestamp.as_ref().map(|t| t.0),
            labels: m.labels.clone().map(Json),
            annotations: m.annotations.clone().map(Json),
            owner_references: m
                .owner_references
                .iter()
                .flatten()
                .map(|r| OwnerReference {
                    api_version: r.api_version.clone(),
                    kind: r.kind.clone(),
                    name: r.name.clone(),
                    uid: r.uid.clone(),
                    controller: r.controller,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl ConditionStatus {
    pub fn parse(s: &str) -> Self {
        match s {
            "True" => Self::True,
            "False" => Self::False,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Condition {
    #[graphql(name = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub reason: Option<String>,
    pub last_transition_time: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

impl From<&crossplane::Condition> for Condition {
    fn from(c: &crossplane::Condition) -> Self {
        Self {
            type_: c.type_.clone(),
            status: ConditionStatus::parse(&c.status),
            reason: c.reason.clone(),
            last_transition_time: c.last_transition_time.as_ref().map(|t| t.0),
            message: c.message.clone(),
        }
    }
}

impl Condition {
    pub fn all(conditions: &[crossplane::Condition]) -> Vec<Self> { conditions.iter().map(Self::from).collect() }

    /// Conditions at `status.conditions` of an untyped object. Absent means
    /// none; present but malformed is a modeling error.
    pub fn from_value(v: Option<&Value>, what: &str) -> Result<Vec<Self>> {
        match v {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => {
                let typed: Vec<crossplane::Condition> = Vec::deserialize(v)
                    .map_err(|e| Error::modeling(what, format!("cannot read conditions: {e}")))?;
                Ok(Self::all(&typed))
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, SimpleObject, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectReference {
    pub api_version: Option<String>,
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub uid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, SimpleObject, Deserialize)]
pub struct SecretReference {
    pub name: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct LabelSelector {
    pub match_labels: Option<Json<BTreeMap<String, String>>>,
}

/// Decode an optional sub-document of an untyped object.
pub(crate) fn part<T: for<'de> Deserialize<'de>>(v: Option<&Value>, what: &str, field: &str) -> Result<Option<T>> {
    match v {
        None | Some(Value::Null) => Ok(None),
        Some(v) => T::deserialize(v).map(Some).map_err(|e| Error::modeling(what, format!("cannot read {field}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meta_copies_owner_references_and_times() {
        let m: metav1::ObjectMeta = serde_json::from_value(json!({
            "name": "rev", "uid": "u1", "generation": 3,
            "creationTimestamp": "2024-01-02T03:04:05Z",
            "labels": { "pkg.crossplane.io/package": "platform-ref-aws" },
            "ownerReferences": [{ "apiVersion": "pkg.crossplane.io/v1", "kind": "Configuration", "name": "c", "uid": "c-uid", "controller": true }]
        }))
        .unwrap();
        let meta = ObjectMeta::from(&m);
        assert_eq!(meta.uid.as_deref(), Some("u1"));
        assert_eq!(meta.generation, Some(3));
        assert_eq!(meta.creation_time.unwrap().to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert_eq!(meta.owner_references.len(), 1);
        assert_eq!(meta.owner_references[0].controller, Some(true));
        assert_eq!(meta.labels.unwrap().0.get("pkg.crossplane.io/package").map(String::as_str), Some("platform-ref-aws"));
    }

    #[test]
    fn conditions_from_untyped() {
        let v = json!([
            { "type": "Ready", "status": "True", "reason": "Available", "lastTransitionTime": "2024-01-02T03:04:05Z" },
            { "type": "Synced", "status": "Weird" }
        ]);
        let c = Condition::from_value(Some(&v), "managed resource").unwrap();
        assert_eq!(c[0].status, ConditionStatus::True);
        assert_eq!(c[1].status, ConditionStatus::Unknown);
        assert!(Condition::from_value(None, "managed resource").unwrap().is_empty());
        let bad = json!([{ "status": "True" }]);
        assert!(matches!(Condition::from_value(Some(&bad), "managed resource"), Err(Error::Modeling { .. })));
    }
}
