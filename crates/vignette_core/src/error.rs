use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    /// Low-level I/O error.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested object was not found.
    /// Maps to **HTTP 404 Not Found**.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The user request was invalid (e.g., bad key format).
    /// Maps to **HTTP 400 Bad Request**.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Generic system or backend-specific failure (e.g., S3 SDK error).
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Storage system failure: {0}")]
    System(String),

    /// The requested feature is not supported by the configured backend.
    /// Maps to **HTTP 501 Not Implemented**.
    #[error("Feature not supported: {0}")]
    Unsupported(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The record does not exist or has been soft-deleted.
    /// Maps to **HTTP 404 Not Found**.
    #[error("{0} not found")]
    NotFound(String),

    /// The request was rejected before reaching the database (e.g., blank name).
    /// Maps to **HTTP 400 Bad Request**.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Database driver or connection failure.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Catalog system failure: {0}")]
    System(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    /// The token is invalid.
    /// Maps to **HTTP 401 Unauthorized**.
    #[error("Unauthorized: Credentials invalid")]
    Invalid,

    /// The token is missing.
    /// Maps to **HTTP 401**.
    #[error("Unauthorized: Credentials missing")]
    Missing,

    /// The user is authenticated but lacks the required scope.
    /// Maps to **HTTP 403 Forbidden**.
    #[error("Insufficient permissions: {0}")]
    Forbidden(String),

    /// Generic provider failure.
    /// Maps to **HTTP 500 Internal Server Error**.
    #[error("Auth system failure: {0}")]
    System(String),
}

/// Failures of the signed asset token.
///
/// Everything but [`TokenError::Configuration`] maps to the same **HTTP 401** response,
/// so clients cannot tell an expired token from a forged one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signing secret is missing. Fatal at startup.
    #[error("Asset signing misconfigured: {0}")]
    Configuration(String),

    /// Bad encoding, wrong field count or unparsable expiry.
    #[error("Malformed asset token: {0}")]
    Malformed(&'static str),

    /// The embedded expiry has passed.
    #[error("Asset token expired")]
    Expired,

    /// The signature does not match the payload.
    #[error("Asset token signature mismatch")]
    InvalidSignature,
}
