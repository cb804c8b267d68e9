//! GraphQL resolvers.
//!
//! Each field asks the [`ClientProvider`] in the schema data for a client
//! scoped to the request's [`Credential`], does its reads through [`fetch`],
//! and drops the client when it returns.

use std::sync::Arc;
use std::time::Instant;

use async_graphql::{Context, ErrorExtensions};
use kgraph_core::{Error, Result};
use kgraph_kubehub::{ClientProvider, Credential, ResourceClient};
use metrics::{counter, histogram};
use tracing::{debug, warn};

pub mod fetch;
mod objects;
mod query;

pub use query::Query;

/// Client for the caller of this request. Requests without credential data
/// are anonymous. Failures here go through [`finish`] like any backend error.
pub(crate) async fn client(ctx: &Context<'_>) -> Result<Arc<dyn ResourceClient>> {
    let provider = ctx
        .data_opt::<Arc<dyn ClientProvider>>()
        .ok_or_else(|| Error::ClientUnavailable("schema has no client provider".into()))?;
    let anonymous = Credential::anonymous();
    let credential = ctx.data_opt::<Credential>().unwrap_or(&anonymous);
    provider.client(credential).await
}

/// Record timing and outcome of a field resolution and convert its error.
pub(crate) fn finish<T>(field: &'static str, t0: Instant, res: Result<T>) -> async_graphql::Result<T> {
    let took = t0.elapsed();
    histogram!("kgraph_resolve_ms", took.as_secs_f64() * 1000.0, "field" => field);
    match res {
        Ok(v) => {
            counter!("kgraph_resolve_total", 1u64, "field" => field, "outcome" => "ok");
            debug!(field, took_ms = %took.as_millis(), "resolve: ok");
            Ok(v)
        }
        Err(e) => {
            counter!("kgraph_resolve_total", 1u64, "field" => field, "outcome" => "error");
            warn!(field, code = e.code(), error = %e, took_ms = %took.as_millis(), "resolve: failed");
            Err(e.extend())
        }
    }
}
