//! In-memory backend for tests and local demos.

use std::sync::Arc;

use kgraph_core::{Error, Result};
use kube::core::{DynamicObject, GroupVersionKind};

use crate::{api_version, describe, ClientProvider, Credential, ResourceClient};

/// Fixed set of objects, listed in insertion order like a backend list.
#[derive(Debug, Clone, Default)]
pub struct MemoryClient {
    objects: Vec<DynamicObject>,
}

impl MemoryClient {
    pub fn new(objects: Vec<DynamicObject>) -> Self { Self { objects } }

    /// Build from raw JSON objects (each must carry apiVersion and kind).
    pub fn from_json(values: Vec<serde_json::Value>) -> std::result::Result<Self, serde_json::Error> {
        let objects = values.into_iter().map(serde_json::from_value).collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(objects))
    }

    fn is_kind(obj: &DynamicObject, gvk: &GroupVersionKind) -> bool {
        obj.types.as_ref().map_or(false, |t| t.api_version == api_version(gvk) && t.kind == gvk.kind)
    }
}

#[async_trait::async_trait]
impl ResourceClient for MemoryClient {
    async fn get(&self, gvk: &GroupVersionKind, namespace: Option<&str>, name: &str) -> Result<DynamicObject> {
        self.objects
            .iter()
            .find(|o| {
                Self::is_kind(o, gvk)
                    && o.metadata.name.as_deref() == Some(name)
                    && o.metadata.namespace.as_deref().filter(|ns| !ns.is_empty()) == namespace
            })
            .cloned()
            .ok_or_else(|| Error::NotFound { what: describe(gvk, namespace, name) })
    }

    async fn list(&self, gvk: &GroupVersionKind) -> Result<Vec<DynamicObject>> {
        Ok(self.objects.iter().filter(|o| Self::is_kind(o, gvk)).cloned().collect())
    }
}

/// Hands every caller the same client, or fails every call.
pub struct StaticProvider {
    client: std::result::Result<Arc<dyn ResourceClient>, String>,
}

impl StaticProvider {
    pub fn new(client: impl ResourceClient + 'static) -> Self { Self { client: Ok(Arc::new(client)) } }

    pub fn unavailable(reason: impl Into<String>) -> Self { Self { client: Err(reason.into()) } }
}

#[async_trait::async_trait]
impl ClientProvider for StaticProvider {
    async fn client(&self, _credential: &Credential) -> Result<Arc<dyn ResourceClient>> {
        self.client.clone().map_err(Error::ClientUnavailable)
    }
}
