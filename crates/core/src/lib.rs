//! kgraph core types: opaque reference ids, paginated connections and the
//! error taxonomy shared by every layer.
//!
//! Nothing in here talks to a cluster. The codec and the connection resolver
//! are pure and safe to call from concurrently resolving fields.

#![forbid(unsafe_code)]

pub mod connection;
pub mod error;
pub mod id;

pub use connection::{Connection, ConnectionResolver};
pub use error::{Error, Result};
pub use id::ReferenceId;

pub mod prelude {
    pub use super::{Connection, ConnectionResolver, Error, ReferenceId, Result};
}
