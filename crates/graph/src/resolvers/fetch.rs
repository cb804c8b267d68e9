//! Backend reads behind each GraphQL field.
//!
//! Everything here takes a client that is already scoped to the caller, so
//! the functions can be driven directly with an in-memory client.

use kgraph_core::prelude::*;
use kgraph_kubehub::{gvk_from, ResourceClient};
use kube::core::DynamicObject;
use tracing::debug;

use crate::classify::classify;
use crate::crossplane::{self, KnownKind, TypedReference};
use crate::model::{
    CompositeResourceDefinition, Composition, CustomResourceDefinition, KubernetesResource, ObjectReference, Secret,
};
use crate::unstructured::{self, Paved};

/// Fetch the object an id points at and classify it.
pub async fn resource(client: &dyn ResourceClient, id: &ReferenceId) -> Result<KubernetesResource> {
    let gvk = gvk_from(&id.api_version, &id.kind);
    let obj = client.get(&gvk, id.namespace(), &id.name).await?;
    classify(&obj)
}

/// Every object of a kind, optionally restricted to one namespace.
pub async fn resources(
    client: &dyn ResourceClient,
    api_version: &str,
    kind: &str,
    namespace: Option<&str>,
    limit: Option<i32>,
) -> Result<Connection<KubernetesResource>> {
    let items = client.list(&gvk_from(api_version, kind)).await?;
    let mut resolver = ConnectionResolver::<DynamicObject>::new(limit);
    if let Some(ns) = namespace {
        resolver = resolver.relationship(move |o: &DynamicObject| o.metadata.namespace.as_deref() == Some(ns));
    }
    resolver.resolve(items, |o| classify(&o))
}

/// Every object of a known kind, modeled exactly.
pub async fn typed<T, M>(client: &dyn ResourceClient, kind: KnownKind, limit: Option<i32>, model: M) -> Result<Connection<T>>
where
    M: Fn(&DynamicObject) -> Result<T>,
{
    let items = client.list(&kind.gvk()).await?;
    ConnectionResolver::new(limit).resolve(items, |o| model(&o))
}

/// Revisions controlled by the package with `owner_uid`. With `active`
/// set, only the revision Crossplane is meant to run.
pub async fn revisions<T, M>(
    client: &dyn ResourceClient,
    kind: KnownKind,
    owner_uid: &str,
    limit: Option<i32>,
    active: Option<bool>,
    model: M,
) -> Result<Connection<T>>
where
    M: Fn(&DynamicObject) -> Result<T>,
{
    let items = client.list(&kind.gvk()).await?;
    let mut resolver =
        ConnectionResolver::new(limit).relationship(|o: &DynamicObject| unstructured::is_controlled_by(&o.metadata, owner_uid));
    if active == Some(true) {
        resolver = resolver.state(|o: &DynamicObject| Paved::of(o).get_str("spec.desiredState") == Some("Active"));
    }
    resolver.resolve(items, |o| model(&o))
}

/// CRDs a provider revision installed. Refs outside `apiextensions.k8s.io`
/// are ignored.
pub async fn provider_revision_objects(
    client: &dyn ResourceClient,
    refs: &[TypedReference],
    limit: Option<i32>,
) -> Result<Connection<KubernetesResource>> {
    let page = ConnectionResolver::new(limit)
        .relationship(|r: &&TypedReference| r.group() == crossplane::K8S_EXT_GROUP)
        .resolve(refs, Ok)?;
    let mut items = Vec::with_capacity(page.items.len());
    for r in page.items {
        let obj = client.get(&gvk_from(&r.api_version, &r.kind), None, &r.name).await?;
        items.push(KubernetesResource::CustomResourceDefinition(CustomResourceDefinition::from_object(&obj)?));
    }
    debug!(count = page.count, items = items.len(), "provider revision objects");
    Ok(Connection { items, count: page.count })
}

/// XRDs and compositions a configuration revision installed. Refs outside
/// `apiextensions.crossplane.io` are neither counted nor fetched.
pub async fn configuration_revision_objects(
    client: &dyn ResourceClient,
    refs: &[TypedReference],
    limit: Option<i32>,
) -> Result<Connection<KubernetesResource>> {
    let page = ConnectionResolver::new(limit)
        .relationship(|r: &&TypedReference| r.group() == crossplane::EXT_GROUP)
        .resolve(refs, Ok)?;
    let mut items = Vec::with_capacity(page.items.len());
    for r in page.items {
        let obj = client.get(&gvk_from(&r.api_version, &r.kind), None, &r.name).await?;
        let item = match r.kind.as_str() {
            "CompositeResourceDefinition" => {
                KubernetesResource::CompositeResourceDefinition(CompositeResourceDefinition::from_object(&obj)?)
            }
            "Composition" => KubernetesResource::Composition(Composition::from_object(&obj)?),
            _ => classify(&obj)?,
        };
        items.push(item);
    }
    debug!(count = page.count, items = items.len(), "configuration revision objects");
    Ok(Connection { items, count: page.count })
}

/// Resources composed by an XR. Refs lacking a kind or name can't be fetched
/// and are skipped.
pub async fn composed_resources(
    client: &dyn ResourceClient,
    refs: &[ObjectReference],
    limit: Option<i32>,
) -> Result<Connection<KubernetesResource>> {
    let page = ConnectionResolver::new(limit)
        .relationship(|r: &&ObjectReference| r.api_version.is_some() && r.kind.is_some() && r.name.is_some())
        .resolve(refs, Ok)?;
    let mut items = Vec::with_capacity(page.items.len());
    for r in page.items {
        let (Some(api_version), Some(kind), Some(name)) = (&r.api_version, &r.kind, &r.name) else {
            continue;
        };
        let namespace = r.namespace.as_deref().filter(|ns| !ns.is_empty());
        let obj = client.get(&gvk_from(api_version, kind), namespace, name).await?;
        items.push(classify(&obj)?);
    }
    Ok(Connection { items, count: page.count })
}

pub async fn secret(client: &dyn ResourceClient, namespace: &str, name: &str) -> Result<Secret> {
    if namespace.is_empty() {
        return Err(Error::Get { what: format!("v1/Secret {name}"), reason: "namespace required".into() });
    }
    let obj = client.get(&crossplane::SECRET.gvk(), Some(namespace), name).await?;
    Secret::from_object(&obj)
}
