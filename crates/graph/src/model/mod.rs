//! GraphQL output records.
//!
//! One record per resource shape. Each is built from an untyped backend
//! object by a `from_object` constructor; the constructors are pure and only
//! fail with conversion or modeling errors.

use async_graphql::{OutputType, SimpleObject};

mod common;
mod composite;
mod crd;
mod definition;
mod generic;
mod managed;
mod package;
mod provider_config;
mod resource;
mod secret;

pub use common::{
    raw_json, Condition, ConditionStatus, LabelSelector, ObjectMeta, ObjectReference, OwnerReference, SecretReference,
};
pub use composite::{CompositeResource, CompositeResourceConnectionDetails, CompositeResourceSpec, CompositeResourceStatus};
pub use crd::{
    CustomResourceDefinition, CustomResourceDefinitionNames, CustomResourceDefinitionSpec, CustomResourceDefinitionStatus,
    CustomResourceDefinitionVersion,
};
pub use definition::{
    CompositeResourceDefinition, CompositeResourceDefinitionControllerStatus, CompositeResourceDefinitionNames,
    CompositeResourceDefinitionSpec, CompositeResourceDefinitionStatus, CompositeResourceDefinitionVersion, Composition,
    CompositionSpec, TypeReference,
};
pub use generic::GenericResource;
pub use managed::{DeletionPolicy, ManagedResource, ManagedResourceSpec, ManagedResourceStatus, ProviderConfigReference};
pub use package::{
    Configuration, ConfigurationRevision, ConfigurationRevisionStatus, PackageRevisionDesiredState, PackageRevisionSpec,
    PackageSpec, PackageStatus, Provider, ProviderRevision, ProviderRevisionStatus, RevisionActivationPolicy,
};
pub use provider_config::{ProviderConfig, ProviderConfigStatus};
pub use resource::KubernetesResource;
pub use secret::Secret;

/// A counted page of `T`, as returned by every relationship field.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(
    concrete(name = "KubernetesResourceConnection", params(KubernetesResource)),
    concrete(name = "ProviderConnection", params(Provider)),
    concrete(name = "ProviderRevisionConnection", params(ProviderRevision)),
    concrete(name = "ConfigurationConnection", params(Configuration)),
    concrete(name = "ConfigurationRevisionConnection", params(ConfigurationRevision)),
    concrete(name = "CompositeResourceDefinitionConnection", params(CompositeResourceDefinition)),
    concrete(name = "CompositionConnection", params(Composition)),
    concrete(name = "CustomResourceDefinitionConnection", params(CustomResourceDefinition))
)]
pub struct Connection<T: OutputType> {
    pub items: Vec<T>,
    pub count: i32,
}

impl<T: OutputType> From<kgraph_core::Connection<T>> for Connection<T> {
    fn from(c: kgraph_core::Connection<T>) -> Self {
        Self { items: c.items, count: i32::try_from(c.count).unwrap_or(i32::MAX) }
    }
}
