use async_graphql::SimpleObject;
use kgraph_core::{Error, ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, Condition, ObjectMeta};
use crate::crossplane;
use crate::unstructured;

#[derive(Debug, Clone, SimpleObject)]
pub struct CustomResourceDefinitionNames {
    pub plural: String,
    pub singular: Option<String>,
    pub short_names: Option<Vec<String>>,
    pub kind: String,
    pub list_kind: Option<String>,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CustomResourceDefinitionVersion {
    pub name: String,
    pub served: bool,
    /// OpenAPI v3 schema as JSON text.
    pub schema: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CustomResourceDefinitionSpec {
    pub group: String,
    pub names: CustomResourceDefinitionNames,
    pub scope: String,
    pub versions: Vec<CustomResourceDefinitionVersion>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CustomResourceDefinitionStatus {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CustomResourceDefinition {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CustomResourceDefinitionSpec,
    pub status: Option<CustomResourceDefinitionStatus>,
    pub raw: String,
}

impl From<crossplane::Names> for CustomResourceDefinitionNames {
    fn from(n: crossplane::Names) -> Self {
        Self {
            plural: n.plural,
            singular: n.singular,
            short_names: n.short_names,
            kind: n.kind,
            list_kind: n.list_kind,
            categories: n.categories,
        }
    }
}

impl CustomResourceDefinition {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let crd: crossplane::CustomResourceDefinition = crossplane::decode(obj, "custom resource definition")?;
        let what = format!("custom resource definition {}", crd.metadata.name.as_deref().unwrap_or_default());
        let versions = crd
            .spec
            .versions
            .into_iter()
            .map(|v| {
                let schema = v
                    .schema
                    .and_then(|s| s.open_api_v3_schema)
                    .map(|s| serde_json::to_string(&s))
                    .transpose()
                    .map_err(|e| Error::modeling(what.as_str(), format!("cannot marshal schema of version {}: {e}", v.name)))?;
                Ok(CustomResourceDefinitionVersion { name: v.name, served: v.served, schema })
            })
            .collect::<Result<Vec<_>>>()?;
        let status = crd.status.map(|s| CustomResourceDefinitionStatus { conditions: Condition::all(&s.conditions) });
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&crd.metadata),
            spec: CustomResourceDefinitionSpec {
                group: crd.spec.group,
                names: crd.spec.names.into(),
                scope: crd.spec.scope,
                versions,
            },
            status,
            raw: raw_json(obj, &what)?,
        })
    }
}
