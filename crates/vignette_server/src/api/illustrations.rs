use super::{ApiError, HttpError, parse_id};
use crate::auth::{InternalCaller, PresignAccess, ScopedUser, WriteScope};
use crate::state::AppState;
use crate::views::{Data, Deleted, DownloadUrl, FileUrls, IllustrationView};

use axum::{
    Json,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, warn};
use vignette_core::prelude::{routes, *};

/// Bytes inspected when sniffing an upload for SVG markup.
const SNIFF_LEN: usize = 512;
const PREMIUM_ONLY_INTERNAL: &str = "premium content is not publicly accessible";

/// The URL clients should load an illustration's image from.
///
/// Public illustrations point at their public stream. Premium ones get a presigned
/// object-store URL for internal callers that asked for one, and a signed asset path
/// otherwise, falling back to the public path if signing fails.
pub(crate) async fn image_url<R: VignetteServices>(
    state: &AppState<R>,
    presign: PresignAccess,
    illustration: &Illustration,
) -> String {
    let config = state.config();
    if !illustration.is_premium {
        return config.public_url(&routes::public_path(illustration.id));
    }

    if presign.0 {
        match state
            .storage()
            .presign_get(&illustration.storage_key, config.presign_ttl)
            .await
        {
            Ok(url) => return config.public_url(&url),
            Err(e) => debug!("Presign failed for illustration {}: {e}", illustration.id),
        }
    }

    match state
        .signer()
        .issue(&illustration.storage_key, config.asset_token_ttl)
    {
        Ok(token) => config.public_url(&routes::signed_path(&token)),
        Err(e) => {
            warn!("Could not sign asset for illustration {}: {e}", illustration.id);
            config.public_url(&routes::public_path(illustration.id))
        }
    }
}

pub(crate) async fn into_view<R: VignetteServices>(
    state: &AppState<R>,
    presign: PresignAccess,
    illustration: Illustration,
) -> IllustrationView {
    let url = image_url(state, presign, &illustration).await;
    IllustrationView::new(illustration, url)
}

pub(crate) async fn into_views<R: VignetteServices>(
    state: &AppState<R>,
    presign: PresignAccess,
    illustrations: Vec<Illustration>,
) -> Vec<IllustrationView> {
    let mut views = Vec::with_capacity(illustrations.len());
    for illustration in illustrations {
        views.push(into_view(state, presign, illustration).await);
    }
    views
}

#[derive(Deserialize, Default)]
pub struct ListParams {
    pub category_id: Option<i64>,
    pub style_id: Option<i64>,
    pub pack_id: Option<i64>,
}

/// GET /illustrations
pub async fn list<R: VignetteServices>(
    State(state): State<AppState<R>>,
    presign: PresignAccess,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = IllustrationFilter {
        category_id: params.category_id,
        style_id: params.style_id,
        pack_id: params.pack_id,
    };
    let items = state.catalog().list_illustrations(filter).await?;
    Ok(Json(Data::new(into_views(&state, presign, items).await)))
}

/// GET /illustrations/{id}
pub async fn get<R: VignetteServices>(
    State(state): State<AppState<R>>,
    presign: PresignAccess,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let illustration = state.catalog().get_illustration(parse_id(&id)?).await?;
    Ok(Json(Data::new(into_view(&state, presign, illustration).await)))
}

#[derive(Deserialize)]
pub struct CreateIllustration {
    pub title: String,
    pub file_name: String,
    pub storage_key: Option<String>,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    #[serde(default)]
    pub is_premium: bool,
}

/// Media types are case-insensitive; parameters such as the boundary are ignored.
fn is_form_data(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("multipart/form-data"))
}

/// POST /illustrations
///
/// JSON registers an object that is already in the store; `multipart/form-data` behaves like
/// [`upload`].
pub async fn create<R: VignetteServices>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    request: Request,
) -> Result<Response, ApiError> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_form_data);

    if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| HttpError::bad_request(e.body_text()))?;
        return process_upload(&state, multipart).await;
    }

    let Json(input) = Json::<CreateIllustration>::from_request(request, &state)
        .await
        .map_err(|e| HttpError::bad_request(e.body_text()))?;

    let storage_key = input
        .storage_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| HttpError::bad_request("storage_key is required when creating via JSON"))?;
    if input.title.trim().is_empty() {
        return Err(HttpError::bad_request("title is required").into());
    }
    if input.file_name.trim().is_empty() {
        return Err(HttpError::bad_request("file_name is required").into());
    }
    if !state.storage().exists(&storage_key).await? {
        return Err(HttpError::bad_request(format!("object '{storage_key}' does not exist")).into());
    }

    let new = NewIllustration {
        title: input.title.trim().to_string(),
        style_id: input.style_id,
        category_id: input.category_id,
        pack_id: input.pack_id,
        file_name: input.file_name,
        storage_key,
        is_premium: input.is_premium,
    };
    check_terms(&state, &new).await?;

    let illustration = state.catalog().create_illustration(new).await?;
    info!("Registered illustration {}", illustration.id);

    let view = into_view(&state, PresignAccess::default(), illustration).await;
    Ok((StatusCode::CREATED, Json(Data::new(view))).into_response())
}

/// POST /illustrations/upload
pub async fn upload<R: VignetteServices>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    process_upload(&state, multipart).await
}

#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    title: Option<String>,
    file_name: Option<String>,
    style_id: Option<i64>,
    category_id: Option<i64>,
    pack_id: Option<i64>,
    is_premium: bool,
}

struct UploadedFile {
    name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| HttpError::bad_request(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "file" {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| HttpError::bad_request(e.body_text()))?;
            form.file = Some(UploadedFile {
                name: file_name,
                content_type,
                data,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| HttpError::bad_request(e.body_text()))?;
        let value = value.trim();
        match name.as_str() {
            "title" => form.title = Some(value.to_string()).filter(|v| !v.is_empty()),
            "file_name" => form.file_name = Some(value.to_string()).filter(|v| !v.is_empty()),
            "style_id" => form.style_id = optional_id(&name, value)?,
            "category_id" => form.category_id = optional_id(&name, value)?,
            "pack_id" => form.pack_id = optional_id(&name, value)?,
            "is_premium" => form.is_premium = flag(&name, value)?,
            _ => debug!("Ignoring unknown form field '{name}'"),
        }
    }

    Ok(form)
}

fn optional_id(field: &str, value: &str) -> Result<Option<i64>, ApiError> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<i64>()
        .map(Some)
        .map_err(|_| HttpError::bad_request(format!("form field '{field}' must be an integer")).into())
}

fn flag(field: &str, value: &str) -> Result<bool, ApiError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "off" => Ok(false),
        "1" | "true" | "on" => Ok(true),
        _ => Err(HttpError::bad_request(format!("form field '{field}' must be a boolean")).into()),
    }
}

/// `.svg` name and `<svg` markup near the start.
fn looks_like_svg(name: &str, data: &[u8]) -> bool {
    if !name.to_ascii_lowercase().ends_with(".svg") {
        return false;
    }
    let head = &data[..data.len().min(SNIFF_LEN)];
    String::from_utf8_lossy(head)
        .to_ascii_lowercase()
        .contains("<svg")
}

/// `{YYYYMMDD}-{16 hex}{ext}`, keeping the extension of the user-facing name.
fn storage_key_for(file_name: &str) -> String {
    let ext = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_else(|| ".svg".to_string());
    let suffix: [u8; 8] = rand::random();

    format!(
        "{}-{}{ext}",
        Utc::now().format("%Y%m%d"),
        hex::encode(suffix)
    )
}

async fn process_upload<R: VignetteServices>(
    state: &AppState<R>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_form(multipart).await?;

    let file = form
        .file
        .ok_or_else(|| HttpError::bad_request("form field 'file' is required"))?;
    let title = form
        .title
        .ok_or_else(|| HttpError::bad_request("form field 'title' is required"))?;

    let original_name = file.name.clone().or_else(|| form.file_name.clone());
    let file_name = form
        .file_name
        .or(file.name)
        .ok_or_else(|| HttpError::bad_request("file name is required"))?;
    if !looks_like_svg(original_name.as_deref().unwrap_or_default(), &file.data) {
        return Err(HttpError::bad_request("only .svg files are allowed").into());
    }

    let new = NewIllustration {
        title,
        style_id: form.style_id,
        category_id: form.category_id,
        pack_id: form.pack_id,
        storage_key: storage_key_for(&file_name),
        file_name,
        is_premium: form.is_premium,
    };
    check_terms(state, &new).await?;

    let storage = state.storage();
    if storage.exists(&new.storage_key).await? {
        return Err(HttpError::conflict(format!(
            "file already exists in storage: {}",
            new.file_name
        ))
        .into());
    }

    let content_type = file
        .content_type
        .filter(|ct| !ct.is_empty())
        .or_else(|| {
            mime_guess::from_path(&new.file_name)
                .first()
                .map(|m| m.essence_str().to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let storage_key = new.storage_key.clone();
    storage
        .put_object(&storage_key, file.data, &content_type)
        .await?;

    let illustration = match state.catalog().create_illustration(new).await {
        Ok(illustration) => illustration,
        Err(e) => {
            if let Err(cleanup) = storage.delete_object(&storage_key).await {
                warn!("Failed to remove orphaned object {storage_key}: {cleanup}");
            }
            return Err(e.into());
        }
    };
    info!(
        "Uploaded illustration {} as {storage_key}",
        illustration.id
    );

    let view = into_view(state, PresignAccess::default(), illustration).await;
    Ok((StatusCode::CREATED, Json(Data::new(view))).into_response())
}

/// Referenced terms must exist and must not be deleted.
async fn check_terms<R: VignetteServices>(
    state: &AppState<R>,
    new: &NewIllustration,
) -> Result<(), ApiError> {
    for (taxonomy, id) in new.term_refs() {
        match state.catalog().get_term(taxonomy, id).await {
            Ok(_) => {}
            Err(CatalogError::NotFound(_)) => {
                return Err(HttpError::bad_request(format!("{taxonomy} {id} does not exist")).into());
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// DELETE /illustrations/{id}
pub async fn delete<R: VignetteServices>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let illustration = state
        .catalog()
        .soft_delete_illustration(parse_id(&id)?)
        .await?;
    Ok(Json(Deleted {
        id: illustration.id,
        deleted_at: illustration.deleted_at,
    }))
}

/// Premium objects are handed out directly only to internal callers.
fn ensure_visible(illustration: &Illustration, internal: InternalCaller) -> Result<(), ApiError> {
    if illustration.is_premium && !internal.0 {
        return Err(HttpError::forbidden(PREMIUM_ONLY_INTERNAL).into());
    }
    Ok(())
}

/// GET /illustrations/{id}/download
pub async fn download<R: VignetteServices>(
    State(state): State<AppState<R>>,
    internal: InternalCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let illustration = state.catalog().get_illustration(parse_id(&id)?).await?;
    ensure_visible(&illustration, internal)?;

    let download_url = state
        .storage()
        .presign_get(&illustration.storage_key, state.config().download_url_ttl)
        .await?;
    Ok(Json(DownloadUrl { download_url }))
}

async fn file_urls<R: VignetteServices>(
    state: &AppState<R>,
    storage_key: &str,
) -> Result<FileUrls, ApiError> {
    let config = state.config();
    let url = state
        .storage()
        .presign_get(storage_key, config.presign_ttl)
        .await?;
    let token = state.signer().issue(storage_key, config.asset_token_ttl)?;

    Ok(FileUrls {
        url,
        expires_in: config.presign_ttl.as_secs(),
        signed_url: config.public_url(&routes::signed_path(&token)),
    })
}

/// GET /illustrations/{id}/file
pub async fn file_by_id<R: VignetteServices>(
    State(state): State<AppState<R>>,
    internal: InternalCaller,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let illustration = state.catalog().get_illustration(parse_id(&id)?).await?;
    ensure_visible(&illustration, internal)?;
    Ok(Json(file_urls(&state, &illustration.storage_key).await?))
}

/// GET /illustrations/file/{key}
///
/// Raw keys bypass the catalog, so only internal callers may use this route.
pub async fn file_by_key<R: VignetteServices>(
    State(state): State<AppState<R>>,
    internal: InternalCaller,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !internal.0 {
        return Err(HttpError::forbidden("internal callers only").into());
    }
    if key.trim().is_empty() || key.contains('|') {
        return Err(HttpError::bad_request("invalid key").into());
    }
    if !state.storage().exists(&key).await? {
        return Err(StorageError::NotFound(key).into());
    }
    Ok(Json(file_urls(&state, &key).await?))
}
