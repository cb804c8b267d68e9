use std::time::Instant;

use async_graphql::{Context, Object};
use kgraph_core::ReferenceId;

use super::{client, fetch, finish};
use crate::crossplane;
use crate::model::{
    CompositeResourceDefinition, Composition, Configuration, Connection, CustomResourceDefinition, KubernetesResource,
    Provider, Secret,
};

type Res<T> = async_graphql::Result<T>;

#[derive(Debug, Default)]
pub struct Query;

#[Object]
impl Query {
    /// The object `id` refers to, classified into its most specific shape.
    async fn kubernetes_resource(&self, ctx: &Context<'_>, id: ReferenceId) -> Res<KubernetesResource> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::resource(c.as_ref(), &id).await
        }
        .await;
        finish("Query.kubernetesResource", t0, res)
    }

    /// Every object of any kind, optionally within one namespace.
    async fn kubernetes_resources(
        &self,
        ctx: &Context<'_>,
        api_version: String,
        kind: String,
        namespace: Option<String>,
        limit: Option<i32>,
    ) -> Res<Connection<KubernetesResource>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::resources(c.as_ref(), &api_version, &kind, namespace.as_deref(), limit).await
        }
        .await;
        finish("Query.kubernetesResources", t0, res.map(Connection::from))
    }

    async fn providers(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<Provider>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::typed(c.as_ref(), crossplane::PROVIDER, limit, Provider::from_object).await
        }
        .await;
        finish("Query.providers", t0, res.map(Connection::from))
    }

    async fn configurations(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<Configuration>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::typed(c.as_ref(), crossplane::CONFIGURATION, limit, Configuration::from_object).await
        }
        .await;
        finish("Query.configurations", t0, res.map(Connection::from))
    }

    async fn composite_resource_definitions(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> Res<Connection<CompositeResourceDefinition>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::typed(
                c.as_ref(),
                crossplane::COMPOSITE_RESOURCE_DEFINITION,
                limit,
                CompositeResourceDefinition::from_object,
            )
            .await
        }
        .await;
        finish("Query.compositeResourceDefinitions", t0, res.map(Connection::from))
    }

    async fn compositions(&self, ctx: &Context<'_>, limit: Option<i32>) -> Res<Connection<Composition>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::typed(c.as_ref(), crossplane::COMPOSITION, limit, Composition::from_object).await
        }
        .await;
        finish("Query.compositions", t0, res.map(Connection::from))
    }

    async fn custom_resource_definitions(
        &self,
        ctx: &Context<'_>,
        limit: Option<i32>,
    ) -> Res<Connection<CustomResourceDefinition>> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::typed(c.as_ref(), crossplane::CUSTOM_RESOURCE_DEFINITION, limit, CustomResourceDefinition::from_object)
                .await
        }
        .await;
        finish("Query.customResourceDefinitions", t0, res.map(Connection::from))
    }

    async fn secret(&self, ctx: &Context<'_>, namespace: String, name: String) -> Res<Secret> {
        let t0 = Instant::now();
        let res = async {
            let c = client(ctx).await?;
            fetch::secret(c.as_ref(), &namespace, &name).await
        }
        .await;
        finish("Query.secret", t0, res)
    }
}
