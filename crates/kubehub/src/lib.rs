//! kgraph kubehub – backend clients scoped to the calling principal.
//!
//! Resolvers ask a [`ClientProvider`] for a [`ResourceClient`] once per field
//! resolution and drop it afterwards. Whether clients are cached, and how
//! credentials are isolated, is entirely the provider's business.

#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;

use kgraph_core::Result;
use kube::core::{DynamicObject, GroupVersionKind};
use metrics::counter;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

mod cluster;
mod memory;

pub use cluster::{KubeClients, KubeResourceClient};
pub use memory::{MemoryClient, StaticProvider};

/// Credential of the authenticated caller. Anonymous when no bearer token
/// was presented.
#[derive(Clone, Default)]
pub struct Credential {
    token: Option<SecretString>,
}

impl Credential {
    pub fn anonymous() -> Self { Self::default() }

    pub fn bearer(token: impl Into<String>) -> Self { Self { token: Some(SecretString::new(token.into())) } }

    /// Parse an `Authorization` header value. `None` unless it carries a
    /// non-empty `Bearer` token.
    pub fn parse_authorization(header: &str) -> Option<Self> {
        let mut parts = header.trim().splitn(2, ' ');
        match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
                Some(Self::bearer(token.trim()))
            }
            _ => None,
        }
    }

    /// Like [`Credential::parse_authorization`], but a header that carries no
    /// usable token falls back to anonymous. The fallback is logged since,
    /// with ambient credentials allowed, the caller then runs as the server.
    pub fn from_authorization(header: &str) -> Self {
        Self::parse_authorization(header).unwrap_or_else(|| {
            // Only the scheme's shape is logged; the value may be a bare token.
            let reason = match header.trim().split_once(' ') {
                Some((scheme, _)) if scheme.eq_ignore_ascii_case("bearer") => "empty bearer token",
                Some(_) => "unsupported scheme",
                None => "no scheme",
            };
            counter!("kgraph_credential_dropped_total", 1u64, "reason" => reason);
            warn!(reason, "authorization header ignored; caller treated as anonymous");
            Self::anonymous()
        })
    }

    pub fn token(&self) -> Option<&str> { self.token.as_ref().map(|t| t.expose_secret().as_str()) }

    pub fn is_anonymous(&self) -> bool { self.token.is_none() }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_anonymous() { "anonymous" } else { "bearer" };
        f.debug_struct("Credential").field("kind", &kind).finish()
    }
}

/// Read access to the backend on behalf of one principal.
#[async_trait::async_trait]
pub trait ResourceClient: Send + Sync {
    /// Fetch a single object. `namespace` is `None` for cluster scoped kinds.
    async fn get(&self, gvk: &GroupVersionKind, namespace: Option<&str>, name: &str) -> Result<DynamicObject>;

    /// List every object of a kind across all namespaces, in backend order.
    /// Items always carry their apiVersion and kind.
    async fn list(&self, gvk: &GroupVersionKind) -> Result<Vec<DynamicObject>>;
}

/// Produces clients scoped to a caller's credential.
#[async_trait::async_trait]
pub trait ClientProvider: Send + Sync {
    async fn client(&self, credential: &Credential) -> Result<Arc<dyn ResourceClient>>;
}

/// `group/version` (or just `version` for the core group).
pub fn api_version(gvk: &GroupVersionKind) -> String {
    if gvk.group.is_empty() { gvk.version.clone() } else { format!("{}/{}", gvk.group, gvk.version) }
}

/// Split an apiVersion into group and version.
pub fn parse_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

pub fn gvk_from(api_version: &str, kind: &str) -> GroupVersionKind {
    let (group, version) = parse_api_version(api_version);
    GroupVersionKind::gvk(group, version, kind)
}

/// Human readable `apiVersion/Kind ns/name` used in error context.
pub fn describe(gvk: &GroupVersionKind, namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{} {}/{}", api_version(gvk), gvk.kind, ns, name),
        None => format!("{}/{} {}", api_version(gvk), gvk.kind, name),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn bearer_header_parses() {
        let c = Credential::from_authorization("Bearer abc.def");
        assert_eq!(c.token(), Some("abc.def"));
        let c = Credential::from_authorization("bearer   tok ");
        assert_eq!(c.token(), Some("tok"));
    }

    #[test]
    fn other_schemes_are_anonymous() {
        assert!(Credential::parse_authorization("Basic dXNlcjpwYXNz").is_none());
        assert!(Credential::parse_authorization("Bearer ").is_none());
        assert!(Credential::from_authorization("Basic dXNlcjpwYXNz").is_anonymous());
        assert!(Credential::from_authorization("Bearer ").is_anonymous());
        assert!(Credential::from_authorization("").is_anonymous());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl<'a> MakeWriter<'a> for LogBuffer {
        type Writer = Guard<'a>;

        fn make_writer(&'a self) -> Self::Writer { Guard(self.0.lock().unwrap()) }
    }

    struct Guard<'a>(MutexGuard<'a, Vec<u8>>);

    impl std::io::Write for Guard<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.0.write(buf) }

        fn flush(&mut self) -> std::io::Result<()> { self.0.flush() }
    }

    impl LogBuffer {
        fn text(&self) -> String { String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned() }
    }

    fn captured(f: impl FnOnce()) -> String {
        let buf = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt().with_writer(buf.clone()).with_ansi(false).finish();
        tracing::subscriber::with_default(subscriber, f);
        buf.text()
    }

    #[test]
    fn dropped_header_is_logged_without_its_value() {
        let logs = captured(|| {
            assert!(Credential::from_authorization("Basic dXNlcjpwYXNz").is_anonymous());
        });
        assert!(logs.contains("caller treated as anonymous"), "{logs}");
        assert!(logs.contains("unsupported scheme"), "{logs}");
        assert!(!logs.contains("dXNlcjpwYXNz"), "{logs}");

        let logs = captured(|| {
            assert!(Credential::from_authorization("s3cr3t-raw-token").is_anonymous());
        });
        assert!(logs.contains("no scheme"), "{logs}");
        assert!(!logs.contains("s3cr3t"), "{logs}");
    }

    #[test]
    fn accepted_header_logs_nothing() {
        let logs = captured(|| {
            assert_eq!(Credential::from_authorization("Bearer abc").token(), Some("abc"));
        });
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn debug_hides_token() {
        let s = format!("{:?}", Credential::bearer("s3cr3t"));
        assert!(!s.contains("s3cr3t"));
    }

    #[test]
    fn api_version_round_trip() {
        let gvk = gvk_from("pkg.crossplane.io/v1", "Provider");
        assert_eq!(gvk.group, "pkg.crossplane.io");
        assert_eq!(api_version(&gvk), "pkg.crossplane.io/v1");
        let core = gvk_from("v1", "Secret");
        assert_eq!(core.group, "");
        assert_eq!(api_version(&core), "v1");
        assert_eq!(describe(&core, Some("ns"), "creds"), "v1/Secret ns/creds");
    }
}
