//! Errors surfaced by id parsing, backend reads and object modeling.

use async_graphql::ErrorExtensions;

/// Every failure a resolution can end in. Variants carry the operation and
/// object they concern so the message stands on its own in a GraphQL error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("cannot decode id: {0}")]
    Decode(String),
    #[error("malformed id: expected 4 parts, found {parts}")]
    Malformed { parts: usize },
    #[error("cannot get client: {0}")]
    ClientUnavailable(String),
    #[error("cannot list {what}: {reason}")]
    List { what: String, reason: String },
    #[error("cannot get {what}: {reason}")]
    Get { what: String, reason: String },
    #[error("{what} not found")]
    NotFound { what: String },
    #[error("cannot convert {what}: {reason}")]
    Conversion { what: String, reason: String },
    #[error("cannot model {what}: {reason}")]
    Modeling { what: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn conversion(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Conversion { what: what.into(), reason: reason.to_string() }
    }

    pub fn modeling(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::Modeling { what: what.into(), reason: reason.to_string() }
    }

    /// Stable machine-readable code, exposed as `extensions.code`.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Decode(_) => "DECODE",
            Error::Malformed { .. } => "MALFORMED",
            Error::ClientUnavailable(_) => "CLIENT_UNAVAILABLE",
            Error::List { .. } => "LIST",
            Error::Get { .. } => "GET",
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Conversion { .. } => "CONVERSION",
            Error::Modeling { .. } => "MODELING",
        }
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", self.code()))
    }
}
