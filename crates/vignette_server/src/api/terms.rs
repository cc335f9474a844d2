//! Category, pack and style routes. One set of handlers, specialised per taxonomy by a marker type.

use super::illustrations::into_views;
use super::{ApiError, parse_id};
use crate::auth::{PresignAccess, ScopedUser, WriteScope};
use crate::state::AppState;
use crate::views::{Data, Deleted, TermView};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use vignette_core::prelude::*;

pub trait TermKind: Send + Sync + 'static {
    const TAXONOMY: Taxonomy;
}

pub struct Categories;
pub struct Packs;
pub struct Styles;

impl TermKind for Categories {
    const TAXONOMY: Taxonomy = Taxonomy::Category;
}

impl TermKind for Packs {
    const TAXONOMY: Taxonomy = Taxonomy::Pack;
}

impl TermKind for Styles {
    const TAXONOMY: Taxonomy = Taxonomy::Style;
}

#[derive(Deserialize)]
pub struct TermInput {
    pub name: String,
}

/// GET /{taxonomy}
pub async fn list<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
) -> Result<impl IntoResponse, ApiError> {
    let terms = state.catalog().list_terms(K::TAXONOMY).await?;
    let views: Vec<TermView> = terms.into_iter().map(TermView::from).collect();
    Ok(Json(Data::new(views)))
}

/// POST /{taxonomy}
pub async fn create<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    Json(input): Json<TermInput>,
) -> Result<impl IntoResponse, ApiError> {
    let term = state.catalog().create_term(K::TAXONOMY, &input.name).await?;
    Ok((StatusCode::CREATED, Json(Data::new(TermView::from(term)))))
}

/// GET /{taxonomy}/{id}
pub async fn get<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let term = state.catalog().get_term(K::TAXONOMY, parse_id(&id)?).await?;
    Ok(Json(Data::new(TermView::from(term))))
}

/// PUT /{taxonomy}/{id}
pub async fn rename<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    Path(id): Path<String>,
    Json(input): Json<TermInput>,
) -> Result<impl IntoResponse, ApiError> {
    let term = state
        .catalog()
        .rename_term(K::TAXONOMY, parse_id(&id)?, &input.name)
        .await?;
    Ok(Json(Data::new(TermView::from(term))))
}

/// DELETE /{taxonomy}/{id}
pub async fn delete<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
    _: ScopedUser<WriteScope>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let term = state
        .catalog()
        .soft_delete_term(K::TAXONOMY, parse_id(&id)?)
        .await?;
    Ok(Json(Deleted {
        id: term.id,
        deleted_at: term.deleted_at,
    }))
}

/// GET /{taxonomy}/{id}/illustrations
pub async fn illustrations<R: VignetteServices, K: TermKind>(
    State(state): State<AppState<R>>,
    presign: PresignAccess,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let catalog = state.catalog();

    // 404 for unknown or deleted terms rather than an empty list.
    catalog.get_term(K::TAXONOMY, id).await?;
    let items = catalog
        .list_illustrations(IllustrationFilter::by(K::TAXONOMY, id))
        .await?;

    Ok(Json(Data::new(into_views(&state, presign, items).await)))
}
