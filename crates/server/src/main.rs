#![forbid(unsafe_code)]

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use kgraph_graph::{build_schema, KgraphSchema};
use kgraph_kubehub::{ClientProvider, Credential, KubeClients};
use metrics::counter;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "kgraphd", version, about = "GraphQL API for Kubernetes and Crossplane resources")]
struct Cli {
    /// Address to serve GraphQL on
    #[arg(long, env = "KGRAPH_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Let requests without a bearer token use the server's own credentials
    #[arg(long, env = "KGRAPH_ALLOW_AMBIENT")]
    allow_ambient: bool,

    /// Maximum query depth
    #[arg(long, env = "KGRAPH_MAX_DEPTH", default_value_t = 16)]
    max_depth: usize,
}

fn init_tracing() {
    let env = std::env::var("KGRAPH_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("KGRAPH_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            warn!(addr = %addr, "invalid KGRAPH_METRICS_ADDR; expected host:port");
        }
    }
}

/// Caller credential from the `Authorization` header.
fn credential(headers: &HeaderMap) -> Credential {
    match headers.get(header::AUTHORIZATION).map(|v| v.to_str()) {
        None => Credential::anonymous(),
        Some(Ok(v)) => Credential::from_authorization(v),
        Some(Err(_)) => {
            warn!("authorization header is not visible ASCII; caller treated as anonymous");
            Credential::anonymous()
        }
    }
}

async fn query(State(schema): State<KgraphSchema>, headers: HeaderMap, req: GraphQLRequest) -> GraphQLResponse {
    let t0 = Instant::now();
    let credential = credential(&headers);
    counter!("kgraph_http_requests_total", 1u64);
    let resp = schema.execute(req.into_inner().data(credential)).await;
    debug!(errors = resp.errors.len(), took_ms = %t0.elapsed().as_millis(), "http: query served");
    resp.into()
}

async fn healthz() -> &'static str { "ok" }

fn router(schema: KgraphSchema) -> Router {
    Router::new().route("/query", post(query)).route("/healthz", get(healthz)).with_state(schema)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();

    let t0 = Instant::now();
    let clients = KubeClients::infer(cli.allow_ambient).await.context("inferring kube config")?;
    let provider: Arc<dyn ClientProvider> = Arc::new(clients);
    let schema = build_schema(provider, cli.max_depth);
    info!(took_ms = %t0.elapsed().as_millis(), max_depth = cli.max_depth, "schema ready");

    let listener = tokio::net::TcpListener::bind(cli.listen).await.with_context(|| format!("binding {}", cli.listen))?;
    info!(addr = %cli.listen, "serving GraphQL on /query");
    axum::serve(listener, router(schema)).with_graceful_shutdown(shutdown_signal()).await.context("serving")?;
    Ok(())
}
