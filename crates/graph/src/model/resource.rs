use async_graphql::Union;
use kgraph_core::ReferenceId;

use super::{
    CompositeResource, CompositeResourceDefinition, Composition, Configuration, ConfigurationRevision,
    CustomResourceDefinition, GenericResource, ManagedResource, Provider, ProviderConfig, ProviderRevision, Secret,
};

/// Any object the API can return where the shape isn't known up front.
#[derive(Debug, Clone, Union)]
pub enum KubernetesResource {
    ManagedResource(ManagedResource),
    ProviderConfig(ProviderConfig),
    CompositeResource(CompositeResource),
    Provider(Provider),
    ProviderRevision(ProviderRevision),
    Configuration(Configuration),
    ConfigurationRevision(ConfigurationRevision),
    CompositeResourceDefinition(CompositeResourceDefinition),
    CustomResourceDefinition(CustomResourceDefinition),
    Composition(Composition),
    Secret(Secret),
    GenericResource(GenericResource),
}

impl KubernetesResource {
    pub fn id(&self) -> &ReferenceId {
        match self {
            Self::ManagedResource(r) => &r.id,
            Self::ProviderConfig(r) => &r.id,
            Self::CompositeResource(r) => &r.id,
            Self::Provider(r) => &r.id,
            Self::ProviderRevision(r) => &r.id,
            Self::Configuration(r) => &r.id,
            Self::ConfigurationRevision(r) => &r.id,
            Self::CompositeResourceDefinition(r) => &r.id,
            Self::CustomResourceDefinition(r) => &r.id,
            Self::Composition(r) => &r.id,
            Self::Secret(r) => &r.id,
            Self::GenericResource(r) => &r.id,
        }
    }

    /// GraphQL type name of the variant.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::ManagedResource(_) => "ManagedResource",
            Self::ProviderConfig(_) => "ProviderConfig",
            Self::CompositeResource(_) => "CompositeResource",
            Self::Provider(_) => "Provider",
            Self::ProviderRevision(_) => "ProviderRevision",
            Self::Configuration(_) => "Configuration",
            Self::ConfigurationRevision(_) => "ConfigurationRevision",
            Self::CompositeResourceDefinition(_) => "CompositeResourceDefinition",
            Self::CustomResourceDefinition(_) => "CustomResourceDefinition",
            Self::Composition(_) => "Composition",
            Self::Secret(_) => "Secret",
            Self::GenericResource(_) => "GenericResource",
        }
    }
}
