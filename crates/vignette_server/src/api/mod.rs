pub(crate) mod assets;
pub(crate) mod illustrations;
pub(crate) mod info;
pub(crate) mod packs;
pub(crate) mod terms;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};
use vignette_core::prelude::*;

/// Uniform body for every rejected asset token.
pub const INVALID_TOKEN: &str = "invalid or expired token";

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// A request-level failure with a fixed status, for checks that have no backend error.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn reply(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(err) = self.0.downcast_ref::<HttpError>() {
            return reply(err.status, err.message.clone());
        }

        if let Some(err) = self.0.downcast_ref::<TokenError>() {
            return match err {
                TokenError::Configuration(_) => {
                    error!("Asset signing unavailable: {:?}", self.0);
                    reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                }
                _ => {
                    debug!("Rejected asset token: {err}");
                    reply(StatusCode::UNAUTHORIZED, INVALID_TOKEN)
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<StorageError>() {
            return match err {
                StorageError::NotFound(_) => reply(StatusCode::NOT_FOUND, "object not found"),
                StorageError::InvalidRequest(_) => reply(StatusCode::BAD_REQUEST, err.to_string()),
                StorageError::Unsupported(_) => reply(StatusCode::NOT_IMPLEMENTED, err.to_string()),
                StorageError::Io(_) | StorageError::System(_) => {
                    error!("Internal Server StorageError: {:?}", self.0);
                    reply(StatusCode::INTERNAL_SERVER_ERROR, "Storage Error")
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<CatalogError>() {
            return match err {
                CatalogError::NotFound(_) => reply(StatusCode::NOT_FOUND, err.to_string()),
                CatalogError::InvalidRequest(_) => reply(StatusCode::BAD_REQUEST, err.to_string()),
                CatalogError::System(_) => {
                    error!("Internal Server CatalogError: {:?}", self.0);
                    reply(StatusCode::INTERNAL_SERVER_ERROR, "Catalog Error")
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<AuthError>() {
            return match err {
                AuthError::Invalid | AuthError::Missing => {
                    reply(StatusCode::UNAUTHORIZED, err.to_string())
                }
                AuthError::Forbidden(_) => reply(StatusCode::FORBIDDEN, err.to_string()),
                AuthError::System(_) => {
                    error!("Internal Auth Provider Error: {:?}", self.0);
                    reply(StatusCode::INTERNAL_SERVER_ERROR, "Auth Error")
                }
            };
        }

        error!("Internal Server Error: {:?}", self.0);
        reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }
}

/// Parses an `{id}` path segment, answering 400 instead of axum's plain-text rejection.
pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| HttpError::bad_request("invalid id").into())
}
