//! kgraph graph – Kubernetes and Crossplane objects as typed GraphQL.
//!
//! The backend hands us untyped objects. [`classify`] picks the output shape
//! for each, [`model`] holds the shapes, and [`resolvers`] wires reads,
//! paging and shaping into the schema built by [`build_schema`].

#![forbid(unsafe_code)]

pub mod classify;
pub mod crossplane;
pub mod model;
pub mod resolvers;
mod schema;
pub mod unstructured;

pub use classify::{classify, Rule, RULES};
pub use model::KubernetesResource;
pub use schema::{build_schema, KgraphSchema};
