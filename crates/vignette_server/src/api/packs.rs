use super::{ApiError, parse_id};
use crate::archive::{ArchiveEntry, build_zip, pack_archive_name};
use crate::state::AppState;

use axum::{
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{info, warn};
use vignette_core::prelude::*;

/// GET /packs/{id}/download
///
/// Zips every live illustration of the pack. Objects that cannot be read are left out.
pub async fn download<R: VignetteServices>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let pack = state.catalog().get_term(Taxonomy::Pack, id).await?;
    let illustrations = state
        .catalog()
        .list_illustrations(IllustrationFilter::by(Taxonomy::Pack, id))
        .await?;

    let mut entries = Vec::with_capacity(illustrations.len());
    for illustration in illustrations {
        match state.storage().get_object(&illustration.storage_key).await {
            Ok(object) => entries.push(ArchiveEntry {
                id: illustration.id,
                name: illustration.file_name,
                data: object.data,
            }),
            Err(e) => warn!(
                "Skipping illustration {} in pack {id}: {e}",
                illustration.id
            ),
        }
    }

    let count = entries.len();
    let archive = tokio::task::spawn_blocking(move || build_zip(entries)).await??;
    info!("Built archive for pack {id} with {count} files");

    let file_name = pack_archive_name(&pack, Utc::now().date_naive());
    let mut response = archive.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename={file_name}"))?,
    );

    Ok(response)
}
