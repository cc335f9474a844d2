use crate::api::{assets, illustrations, info, packs, terms};
use crate::api::terms::{Categories, Packs, Styles, TermKind};
use crate::prelude::*;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;
use vignette_core::prelude::{routes::*, *};

const MIN_INTERNAL_SECRET_LEN: usize = 16;

/// The builder for the Vignette Server.
#[derive(Clone, Debug, Default)]
pub struct VignetteServer {
    config: ServerConfig,
}

impl VignetteServer {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }
}

impl VignetteServer {
    pub fn build<R: VignetteServices>(self, services: R, signer: AssetSigner) -> Router {
        match self.config.internal_presign_secret.as_deref() {
            Some(secret) if secret.len() < MIN_INTERNAL_SECRET_LEN => {
                warn!("Internal presign secret is short. Consider a longer random value!")
            }
            None => warn!("No internal presign secret set, presigned URLs are disabled for listings"),
            _ => {}
        }

        let body_limit = self.config.max_upload_bytes;
        let state = AppState {
            services,
            signer,
            config: Arc::new(self.config),
        };

        let api = Router::new()
            .route(INFO_ABOUT, get(info::about::<R>))
            .route(INFO_LICENSE, get(info::license::<R>))
            .merge(term_routes::<R, Categories>(
                CATEGORIES,
                CATEGORY_BY_ID,
                CATEGORY_ILLUSTRATIONS,
            ))
            .merge(term_routes::<R, Packs>(
                PACKS,
                PACK_BY_ID,
                PACK_ILLUSTRATIONS,
            ))
            .merge(term_routes::<R, Styles>(
                STYLES,
                STYLE_BY_ID,
                STYLE_ILLUSTRATIONS,
            ))
            .route(PACK_DOWNLOAD, get(packs::download::<R>))
            .route(
                ILLUSTRATIONS,
                get(illustrations::list::<R>).post(illustrations::create::<R>),
            )
            .route(ILLUSTRATIONS_UPLOAD, post(illustrations::upload::<R>))
            .route(
                ILLUSTRATION_BY_ID,
                get(illustrations::get::<R>).delete(illustrations::delete::<R>),
            )
            .route(ILLUSTRATION_DOWNLOAD, get(illustrations::download::<R>))
            .route(ILLUSTRATION_FILE, get(illustrations::file_by_id::<R>))
            .route(ILLUSTRATION_PUBLIC, get(assets::public::<R>))
            .route(FILE_BY_KEY, get(illustrations::file_by_key::<R>))
            .route(SIGNED_ASSET, get(assets::signed::<R>));

        Router::new()
            .route(HEALTH, get(|| async { "OK" }))
            .nest(API_PREFIX, api)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

fn term_routes<R: VignetteServices, K: TermKind>(
    collection: &str,
    item: &str,
    members: &str,
) -> Router<AppState<R>> {
    Router::new()
        .route(collection, get(terms::list::<R, K>).post(terms::create::<R, K>))
        .route(
            item,
            get(terms::get::<R, K>)
                .put(terms::rename::<R, K>)
                .delete(terms::delete::<R, K>),
        )
        .route(members, get(terms::illustrations::<R, K>))
}
