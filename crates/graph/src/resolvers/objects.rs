//! Relationship fields on the output records.

use std::time::Instant;

use async_graphql::{ComplexObject, Context};

use super::{client, fetch, finish};
use crate::crossplane;
use crate::model::{
    CompositeResource, Configuration, ConfigurationRevision, ConfigurationRevisionStatus, Connection, KubernetesResource,
    Provider, ProviderRevision, ProviderRevisionStatus,
};

type Res<T> = async_graphql::Result<T>;

#[ComplexObject]
impl Provider {
    /// Revisions this provider controls. `active: true` keeps only the one
    /// Crossplane runs.
    async fn revisions(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        active: Option<bool>,
    ) -> Res<Connection<ProviderRevision>> {
        let t0 = Instant::now();
        let uid = self.metadata.uid.as_deref().unwrap_or_default();
        let res = async {
            let c = client(ctx).await?;
            fetch::revisions(c.as_ref(), crossplane::PROVIDER_REVISION, uid, limit, active, ProviderRevision::from_object)
                .await
        }
        .await;
        finish("Provider.revisions", t0, res.map(Connection::from))
    }
}

#[ComplexObject]
impl Configuration {
    async fn revisions(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
        active: Option<bool>,
    ) -> Res<Connection<ConfigurationRevision>> {
        let t0 = Instant::now();
        let uid = self.metadata.uid.as_deref().unwrap_or_default();
        let res = async {
            let c = client(ctx).await?;
            fetch::revisions(
                c.as_ref(),
                crossplane::CONFIGURATION_REVISION,
                uid,
                limit,
                active,
                ConfigurationRevision::from_object,
            )
            .await
        }
        .await;
        finish("Configuration.revisions", t0, res.map(Connection::from))
    }
}

#[ComplexObject]
impl ProviderRevisionStatus {
    /// CRDs installed by the revision.
    async fn objects(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<KubernetesResource>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::provider_revision_objects(c.as_ref(), &self.object_refs, limit).await
        }
        .await;
        finish("ProviderRevisionStatus.objects", t0, res.map(Connection::from))
    }
}

#[ComplexObject]
impl ConfigurationRevisionStatus {
    /// XRDs and compositions installed by the revision.
    async fn objects(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<KubernetesResource>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::configuration_revision_objects(c.as_ref(), &self.object_refs, limit).await
        }
        .await;
        finish("ConfigurationRevisionStatus.objects", t0, res.map(Connection::from))
    }
}

#[ComplexObject]
impl CompositeResource {
    /// The composed resources named by `spec.resourceRefs`.
    async fn resources(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<KubernetesResource>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::composed_resources(c.as_ref(), &self.spec.resource_refs, limit).await
        }
        .await;
        finish("CompositeResource.resources", t0, res.map(Connection::from))
    }
}
