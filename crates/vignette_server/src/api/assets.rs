//! Streams SVG bytes through the API: publicly by id, or behind a signed asset token.

use super::{ApiError, HttpError, parse_id};
use crate::state::AppState;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};
use tracing::debug;
use vignette_core::prelude::*;

const SVG: &str = "image/svg+xml";
const CSP: &str = "default-src 'none'; img-src 'self'; style-src 'unsafe-inline'";

const SIGNED_MAX_AGE: u32 = 900;
const PUBLIC_MAX_AGE: u32 = 86_400;

/// Stable entity tag of a storage key: unpadded base64url of the first 8 bytes of its SHA-256.
pub fn etag(storage_key: &str) -> String {
    let digest = Sha256::digest(storage_key.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..8])
}

/// Quotes and backslashes would break out of the `filename="..."` parameter.
fn disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("inline; filename=\"{safe}\"")
}

async fn serve_svg<R: VignetteServices>(
    state: &AppState<R>,
    headers: &HeaderMap,
    storage_key: &str,
    file_name: &str,
    max_age: u32,
) -> Result<Response, ApiError> {
    let object = state.storage().get_object(storage_key).await?;

    let tag = etag(storage_key);
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok());
    if if_none_match.is_some_and(|v| v == tag) {
        debug!("Not modified: {storage_key}");
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let content_type = object
        .content_type
        .filter(|ct| ct.contains("svg"))
        .unwrap_or_else(|| SVG.to_string());

    let mut response = object.data.into_response();
    let out = response.headers_mut();
    out.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type).unwrap_or(HeaderValue::from_static(SVG)),
    );
    out.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(&format!("public, max-age={max_age}"))?,
    );
    out.insert(header::ETAG, HeaderValue::from_str(&tag)?);
    out.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&disposition(file_name))
            .unwrap_or(HeaderValue::from_static("inline")),
    );
    out.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP),
    );

    Ok(response)
}

/// GET /illustrations/{id}/public
pub async fn public<R: VignetteServices>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let illustration = state.catalog().get_illustration(parse_id(&id)?).await?;
    if illustration.is_premium {
        return Err(HttpError::forbidden("premium content is not publicly accessible").into());
    }

    serve_svg(
        &state,
        &headers,
        &illustration.storage_key,
        &illustration.file_name,
        PUBLIC_MAX_AGE,
    )
    .await
}

/// GET /i/{token}
pub async fn signed<R: VignetteServices>(
    State(state): State<AppState<R>>,
    headers: HeaderMap,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let storage_key = state.signer().validate(&token)?;
    serve_svg(&state, &headers, &storage_key, &storage_key, SIGNED_MAX_AGE).await
}
