use crate::api::ApiError;
use crate::state::AppState;

use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::Deserialize;
use std::marker::PhantomData;
use vignette_core::prelude::{headers::INTERNAL_REQUEST, scopes::*, *};

/// A wrapper struct indicating a request has been authenticated.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

impl<R> FromRequestParts<AppState<R>> for AuthenticatedUser
where
    R: VignetteServices,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("Authorization")
            .and_then(|auth_header| {
                auth_header
                    .to_str()
                    .map(|header_str| {
                        header_str
                            .strip_prefix("Bearer ")
                            .unwrap_or(header_str)
                            .trim()
                    })
                    .ok()
            })
            .unwrap_or("");

        state
            .auth()
            .verify(token)
            .await
            .map(AuthenticatedUser)
            .map_err(ApiError::from)
    }
}

/// A permission a route requires.
pub trait Scope: Send + Sync + 'static {
    const NAME: &'static str;
}

/// Create, update, delete and upload.
pub struct WriteScope;

impl Scope for WriteScope {
    const NAME: &'static str = WRITE;
}

/// An [`AuthenticatedUser`] holding scope `S` or `admin`.
pub struct ScopedUser<S: Scope> {
    pub user: User,
    _scope: PhantomData<S>,
}

impl<S: Scope> ScopedUser<S> {
    fn check(user: User) -> Result<Self, AuthError> {
        if user.scopes.iter().any(|s| s == ADMIN || s == S::NAME) {
            Ok(Self {
                user,
                _scope: PhantomData,
            })
        } else {
            Err(AuthError::Forbidden(format!(
                "Missing permission: '{}' scope required.",
                S::NAME
            )))
        }
    }
}

impl<R, S> FromRequestParts<AppState<R>> for ScopedUser<S>
where
    R: VignetteServices,
    S: Scope,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;
        Self::check(user).map_err(ApiError::from)
    }
}

#[derive(Deserialize)]
struct PresignQuery {
    include_presign: Option<String>,
}

fn is_internal(parts: &Parts, secret: Option<&str>) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        return false;
    };
    parts
        .headers
        .get(INTERNAL_REQUEST)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == secret)
}

/// Whether the caller sent an `X-Internal-Request` header matching
/// [`crate::config::ServerConfig::internal_presign_secret`]. Never rejects.
#[derive(Clone, Copy, Debug, Default)]
pub struct InternalCaller(pub bool);

impl<R> FromRequestParts<AppState<R>> for InternalCaller
where
    R: VignetteServices,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let secret = state.config().internal_presign_secret.as_deref();
        Ok(Self(is_internal(parts, secret)))
    }
}

/// Whether an [`InternalCaller`] also asked for presigned URLs with `?include_presign=1`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PresignAccess(pub bool);

impl<R> FromRequestParts<AppState<R>> for PresignAccess
where
    R: VignetteServices,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let requested = Query::<PresignQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.include_presign)
            .is_some_and(|v| v == "1");
        let secret = state.config().internal_presign_secret.as_deref();

        Ok(Self(requested && is_internal(parts, secret)))
    }
}
