use std::sync::Arc;

use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use kgraph_kubehub::ClientProvider;

use crate::resolvers::Query;

pub type KgraphSchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Read-only schema with `provider` in its data. Per-request credentials are
/// attached to each request by the transport.
pub fn build_schema(provider: Arc<dyn ClientProvider>, max_depth: usize) -> KgraphSchema {
    Schema::build(Query, EmptyMutation, EmptySubscription).data(provider).limit_depth(max_depth).finish()
}
