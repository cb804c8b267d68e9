use async_graphql::SimpleObject;
use kgraph_core::{Error, ReferenceId, Result};
use kube::core::DynamicObject;

use super::common::{raw_json, Condition, ObjectMeta};
use crate::crossplane;
use crate::unstructured;

#[derive(Debug, Clone, PartialEq, Eq, SimpleObject)]
pub struct TypeReference {
    pub api_version: String,
    pub kind: String,
}

impl From<crossplane::TypeRef> for TypeReference {
    fn from(t: crossplane::TypeRef) -> Self { Self { api_version: t.api_version, kind: t.kind } }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CompositeResourceDefinitionNames {
    pub plural: String,
    pub singular: Option<String>,
    pub short_names: Option<Vec<String>>,
    pub kind: String,
    pub list_kind: Option<String>,
    pub categories: Option<Vec<String>>,
}

impl From<crossplane::Names> for CompositeResourceDefinitionNames {
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

#[derive(Debug, Clone, SimpleObject)]
pub struct CompositeResourceDefinitionVersion {
    pub name: String,
    pub referenceable: bool,
    pub served: bool,
    /// The version's OpenAPI v3 schema as JSON text.
    pub schema: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CompositeResourceDefinitionSpec {
    pub group: String,
    pub names: CompositeResourceDefinitionNames,
    pub claim_names: Option<CompositeResourceDefinitionNames>,
    pub connection_secret_keys: Option<Vec<String>>,
    pub default_composition_ref: Option<String>,
    pub enforced_composition_ref: Option<String>,
    pub versions: Vec<CompositeResourceDefinitionVersion>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CompositeResourceDefinitionControllerStatus {
    pub composite_resource_type: Option<TypeReference>,
    pub composite_resource_claim_type: Option<TypeReference>,
}

#[derive(Debug, Clone, Default, SimpleObject)]
pub struct CompositeResourceDefinitionStatus {
    pub conditions: Vec<Condition>,
    pub controllers: Option<CompositeResourceDefinitionControllerStatus>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CompositeResourceDefinition {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositeResourceDefinitionSpec,
    pub status: Option<CompositeResourceDefinitionStatus>,
    pub raw: String,
}

impl CompositeResourceDefinition {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let xrd: crossplane::CompositeResourceDefinition = crossplane::decode(obj, "composite resource definition")?;
        let what = format!("composite resource definition {}", xrd.metadata.name.as_deref().unwrap_or_default());
        let versions = xrd
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
                Ok(CompositeResourceDefinitionVersion { name: v.name, referenceable: v.referenceable, served: v.served, schema })
            })
            .collect::<Result<Vec<_>>>()?;
        let spec = CompositeResourceDefinitionSpec {
            group: xrd.spec.group,
            names: xrd.spec.names.into(),
            claim_names: xrd.spec.claim_names.map(Into::into),
            connection_secret_keys: xrd.spec.connection_secret_keys,
            default_composition_ref: xrd.spec.default_composition_ref.map(|r| r.name),
            enforced_composition_ref: xrd.spec.enforced_composition_ref.map(|r| r.name),
            versions,
        };
        let status = xrd.status.map(|s| CompositeResourceDefinitionStatus {
            conditions: Condition::all(&s.conditions),
            controllers: s.controllers.map(|c| CompositeResourceDefinitionControllerStatus {
                composite_resource_type: c.composite_resource_type.map(Into::into),
                composite_resource_claim_type: c.composite_resource_claim_type.map(Into::into),
            }),
        });
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&xrd.metadata),
            spec,
            status,
            raw: raw_json(obj, &what)?,
        })
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CompositionSpec {
    pub composite_type_ref: TypeReference,
    pub write_connection_secrets_to_namespace: Option<String>,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Composition {
    pub id: ReferenceId,
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: CompositionSpec,
    pub raw: String,
}

impl Composition {
    pub fn from_object(obj: &DynamicObject) -> Result<Self> {
        let c: crossplane::Composition = crossplane::decode(obj, "composition")?;
        Ok(Self {
            id: unstructured::reference_id(obj),
            api_version: unstructured::api_version(obj).to_owned(),
            kind: unstructured::kind(obj).to_owned(),
            metadata: ObjectMeta::from(&c.metadata),
            spec: CompositionSpec {
                composite_type_ref: c.spec.composite_type_ref.into(),
                write_connection_secrets_to_namespace: c.spec.write_connection_secrets_to_namespace,
            },
            raw: raw_json(obj, "composition")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: serde_json::Value) -> DynamicObject { serde_json::from_value(v).unwrap() }

    #[test]
    fn xrd_serializes_version_schema() {
        let o = obj(json!({
            "apiVersion": "apiextensions.crossplane.io/v1", "kind": "CompositeResourceDefinition",
            "metadata": { "name": "xnetworks.example.org" },
            "spec": {
                "group": "example.org",
                "names": { "kind": "XNetwork", "plural": "xnetworks" },
                "claimNames": { "kind": "Network", "plural": "networks" },
                "defaultCompositionRef": { "name": "xnetworks.aws" },
                "versions": [{
                    "name": "v1alpha1", "served": true, "referenceable": true,
                    "schema": { "openAPIV3Schema": { "type": "object" } }
                }]
            },
            "status": { "controllers": { "compositeResourceType": { "apiVersion": "example.org/v1alpha1", "kind": "XNetwork" } } }
        }));
        let xrd = CompositeResourceDefinition::from_object(&o).unwrap();
        assert_eq!(xrd.spec.names.kind, "XNetwork");
        assert_eq!(xrd.spec.claim_names.unwrap().kind, "Network");
        assert_eq!(xrd.spec.default_composition_ref.as_deref(), Some("xnetworks.aws"));
        assert_eq!(xrd.spec.versions[0].schema.as_deref(), Some(r#"{"type":"object"}"#));
        let controllers = xrd.status.unwrap().controllers.unwrap();
        assert_eq!(controllers.composite_resource_type.unwrap().kind, "XNetwork");
    }

    #[test]
    fn composition_requires_type_ref() {
        let ok = obj(json!({
            "apiVersion": "apiextensions.crossplane.io/v1", "kind": "Composition",
            "metadata": { "name": "xnetworks.aws" },
            "spec": { "compositeTypeRef": { "apiVersion": "example.org/v1alpha1", "kind": "XNetwork" } }
        }));
        assert_eq!(Composition::from_object(&ok).unwrap().spec.composite_type_ref.kind, "XNetwork");
        let bad = obj(json!({
            "apiVersion": "apiextensions.crossplane.io/v1", "kind": "Composition",
            "metadata": { "name": "xnetworks.aws" },
            "spec": {}
        }));
        assert!(matches!(Composition::from_object(&bad), Err(Error::Conversion { .. })));
    }
}
