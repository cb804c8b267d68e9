//! Opaque reference ids.
//!
//! A [`ReferenceId`] is the "primary key" GraphQL clients see for any
//! Kubernetes object. It is the reference tuple
//! `apiVersion|kind|namespace|name`, base64 encoded without padding so that
//! clients treat it as opaque. Cluster scoped objects have an empty namespace
//! part, i.e. `apiVersion|kind||name`.
//!
//! The separator is not escaped. An object whose namespace or name contains
//! `|` encodes to a token that no longer splits into four parts, and decoding
//! it fails with [`Error::Malformed`].

use std::fmt;
use std::str::FromStr;

use async_graphql::{InputValueError, InputValueResult, Scalar, ScalarType, Value};
use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Field separator inside the encoded payload.
pub const SEPARATOR: char = '|';

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId {
    pub api_version: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl ReferenceId {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self { api_version: api_version.into(), kind: kind.into(), namespace: namespace.into(), name: name.into() }
    }

    /// Id of a cluster scoped object.
    pub fn cluster(api_version: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(api_version, kind, String::new(), name)
    }

    pub fn is_cluster_scoped(&self) -> bool { self.namespace.is_empty() }

    pub fn namespace(&self) -> Option<&str> {
        if self.namespace.is_empty() { None } else { Some(&self.namespace) }
    }

    pub fn encode(&self) -> String {
        let joined = [self.api_version.as_str(), self.kind.as_str(), self.namespace.as_str(), self.name.as_str()]
            .join(&SEPARATOR.to_string());
        STANDARD_NO_PAD.encode(joined.as_bytes())
    }

    pub fn decode(token: &str) -> Result<Self> {
        let bytes = STANDARD_NO_PAD.decode(token).map_err(|e| Error::Decode(e.to_string()))?;
        let payload = String::from_utf8(bytes).map_err(|e| Error::Decode(e.to_string()))?;
        let parts: Vec<&str> = payload.split(SEPARATOR).collect();
        match parts.as_slice() {
            [api_version, kind, namespace, name] => Ok(Self::new(*api_version, *kind, *namespace, *name)),
            _ => Err(Error::Malformed { parts: parts.len() }),
        }
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.encode()) }
}

impl FromStr for ReferenceId {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> { Self::decode(s) }
}

/// GraphQL `ReferenceID`: a string on the wire, rejected at input coercion
/// when it does not decode.
#[Scalar(name = "ReferenceID")]
impl ScalarType for ReferenceId {
    fn parse(value: Value) -> InputValueResult<Self> {
        match &value {
            Value::String(s) => ReferenceId::decode(s).map_err(InputValueError::custom),
            _ => Err(InputValueError::expected_type(value)),
        }
    }

    fn is_valid(value: &Value) -> bool { matches!(value, Value::String(_)) }

    fn to_value(&self) -> Value { Value::String(self.encode()) }
}
