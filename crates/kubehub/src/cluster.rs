//! kube-rs backed clients.

use std::sync::Arc;
use std::time::Instant;

use kgraph_core::{Error, Result};
use kube::{
    api::{Api, ListParams},
    config::AuthInfo,
    core::{ApiResource, DynamicObject, GroupVersionKind, TypeMeta},
    discovery::{self, Scope},
    Client, Config,
};
use metrics::{counter, histogram};
use secrecy::SecretString;
use tracing::{debug, info};

use crate::{api_version, describe, ClientProvider, Credential, ResourceClient};

/// Kinds we read on every request; resolving them skips discovery.
/// `(group, version, kind, plural, namespaced)`
const WELL_KNOWN: &[(&str, &str, &str, &str, bool)] = &[
    ("pkg.crossplane.io", "v1", "Provider", "providers", false),
    ("pkg.crossplane.io", "v1", "ProviderRevision", "providerrevisions", false),
    ("pkg.crossplane.io", "v1", "Configuration", "configurations", false),
    ("pkg.crossplane.io", "v1", "ConfigurationRevision", "configurationrevisions", false),
    ("apiextensions.crossplane.io", "v1", "CompositeResourceDefinition", "compositeresourcedefinitions", false),
    ("apiextensions.crossplane.io", "v1", "Composition", "compositions", false),
    ("apiextensions.k8s.io", "v1", "CustomResourceDefinition", "customresourcedefinitions", false),
    ("", "v1", "Secret", "secrets", true),
];

fn well_known(gvk: &GroupVersionKind) -> Option<(ApiResource, bool)> {
    WELL_KNOWN
        .iter()
        .find(|(g, v, k, _, _)| *g == gvk.group && *v == gvk.version && *k == gvk.kind)
        .map(|(_, _, _, plural, namespaced)| (ApiResource::from_gvk_with_plural(gvk, plural), *namespaced))
}

/// Provider building one kube client per resolution, authenticated as the
/// caller. The base config (cluster URL, CA, timeouts) is inferred once.
pub struct KubeClients {
    base: Config,
    allow_ambient: bool,
}

impl KubeClients {
    /// Infer the base config from `KUBECONFIG`/`~/.kube/config` or the
    /// in-cluster service account. With `allow_ambient`, anonymous callers
    /// act with the server's own identity instead of being rejected.
    pub async fn infer(allow_ambient: bool) -> Result<Self> {
        let base = Config::infer().await.map_err(|e| Error::ClientUnavailable(format!("cannot infer kube config: {e}")))?;
        info!(cluster = %base.cluster_url, allow_ambient, "kube config inferred");
        Ok(Self::with_config(base, allow_ambient))
    }

    pub fn with_config(base: Config, allow_ambient: bool) -> Self { Self { base, allow_ambient } }

    fn config_for(&self, credential: &Credential) -> Result<Config> {
        let mut config = self.base.clone();
        match credential.token() {
            Some(token) => {
                // Only the caller's token; never fall back to our own auth.
                config.auth_info = AuthInfo { token: Some(SecretString::new(token.to_owned())), ..AuthInfo::default() };
            }
            None if self.allow_ambient => {}
            None => return Err(Error::ClientUnavailable("no bearer token supplied".into())),
        }
        Ok(config)
    }
}

#[async_trait::async_trait]
impl ClientProvider for KubeClients {
    async fn client(&self, credential: &Credential) -> Result<Arc<dyn ResourceClient>> {
        let config = self.config_for(credential).map_err(|e| {
            counter!("kgraph_client_errors_total", 1u64, "op" => "client");
            e
        })?;
        let client = Client::try_from(config).map_err(|e| {
            counter!("kgraph_client_errors_total", 1u64, "op" => "client");
            Error::ClientUnavailable(e.to_string())
        })?;
        debug!(credential = ?credential, "kube client ready");
        Ok(Arc::new(KubeResourceClient::new(client)))
    }
}

/// [`ResourceClient`] over a single kube client.
pub struct KubeResourceClient {
    client: Client,
}

impl KubeResourceClient {
    pub fn new(client: Client) -> Self { Self { client } }

    async fn api_resource(&self, gvk: &GroupVersionKind) -> std::result::Result<(ApiResource, bool), kube::Error> {
        if let Some(known) = well_known(gvk) {
            return Ok(known);
        }
        let (ar, caps) = discovery::pinned_kind(&self.client, gvk).await?;
        Ok((ar, matches!(caps.scope, Scope::Namespaced)))
    }
}

fn is_not_found(e: &kube::Error) -> bool { matches!(e, kube::Error::Api(ae) if ae.code == 404) }

#[async_trait::async_trait]
impl ResourceClient for KubeResourceClient {
    async fn get(&self, gvk: &GroupVersionKind, namespace: Option<&str>, name: &str) -> Result<DynamicObject> {
        let t0 = Instant::now();
        let what = describe(gvk, namespace, name);
        let get_err = |e: kube::Error| {
            counter!("kgraph_client_errors_total", 1u64, "op" => "get");
            if is_not_found(&e) { Error::NotFound { what: what.clone() } } else { Error::Get { what: what.clone(), reason: e.to_string() } }
        };
        let (ar, namespaced) = self.api_resource(gvk).await.map_err(get_err)?;
        let api: Api<DynamicObject> = match (namespaced, namespace) {
            (true, Some(ns)) => Api::namespaced_with(self.client.clone(), ns, &ar),
            (true, None) => return Err(Error::Get { what: what.clone(), reason: "namespace required for namespaced kind".into() }),
            (false, _) => Api::all_with(self.client.clone(), &ar),
        };
        let mut obj = api.get(name).await.map_err(get_err)?;
        fill_types(&mut obj, &ar);
        histogram!("kgraph_client_get_ms", t0.elapsed().as_secs_f64() * 1000.0);
        debug!(object = %what, took_ms = %t0.elapsed().as_millis(), "kube: get ok");
        Ok(obj)
    }

    async fn list(&self, gvk: &GroupVersionKind) -> Result<Vec<DynamicObject>> {
        let t0 = Instant::now();
        let list_err = |e: kube::Error| {
            counter!("kgraph_client_errors_total", 1u64, "op" => "list");
            Error::List { what: format!("{}/{}", api_version(gvk), gvk.kind), reason: e.to_string() }
        };
        let (ar, _) = self.api_resource(gvk).await.map_err(list_err)?;
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &ar);
        let list = api.list(&ListParams::default()).await.map_err(list_err)?;
        let mut items = list.items;
        for obj in items.iter_mut() {
            fill_types(obj, &ar);
        }
        histogram!("kgraph_client_list_ms", t0.elapsed().as_secs_f64() * 1000.0);
        debug!(kind = %gvk.kind, count = items.len(), took_ms = %t0.elapsed().as_millis(), "kube: list ok");
        Ok(items)
    }
}

// List items come back without apiVersion/kind.
fn fill_types(obj: &mut DynamicObject, ar: &ApiResource) {
    if obj.types.is_none() {
        obj.types = Some(TypeMeta { api_version: ar.api_version.clone(), kind: ar.kind.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_kinds_skip_discovery() {
        let (ar, namespaced) = well_known(&GroupVersionKind::gvk("pkg.crossplane.io", "v1", "ConfigurationRevision")).unwrap();
        assert_eq!(ar.plural, "configurationrevisions");
        assert_eq!(ar.api_version, "pkg.crossplane.io/v1");
        assert!(!namespaced);
        let (ar, namespaced) = well_known(&GroupVersionKind::gvk("", "v1", "Secret")).unwrap();
        assert_eq!(ar.api_version, "v1");
        assert!(namespaced);
        assert!(well_known(&GroupVersionKind::gvk("s3.aws.upbound.io", "v1beta1", "Bucket")).is_none());
    }

    #[test]
    fn fills_missing_type_meta() {
        let ar = ApiResource::from_gvk_with_plural(&GroupVersionKind::gvk("pkg.crossplane.io", "v1", "Provider"), "providers");
        let mut obj: DynamicObject = serde_json::from_value(serde_json::json!({
            "metadata": { "name": "provider-aws" },
            "spec": { "package": "xpkg.upbound.io/upbound/provider-aws:v1" }
        }))
        .unwrap();
        assert!(obj.types.is_none());
        fill_types(&mut obj, &ar);
        let types = obj.types.unwrap();
        assert_eq!(types.api_version, "pkg.crossplane.io/v1");
        assert_eq!(types.kind, "Provider");
    }

    #[test]
    fn ambient_requires_opt_in() {
        let base = Config::new("https://127.0.0.1:6443".parse().unwrap());
        let strict = KubeClients::with_config(base.clone(), false);
        assert!(matches!(strict.config_for(&Credential::anonymous()), Err(Error::ClientUnavailable(_))));
        let cfg = strict.config_for(&Credential::bearer("tok")).unwrap();
        assert!(cfg.auth_info.token.is_some());
        let ambient = KubeClients::with_config(base, true);
        assert!(ambient.config_for(&Credential::anonymous()).is_ok());
    }
}
