use crate::state::AppState;
use crate::views::{About, License};

use axum::{Json, extract::State};
use vignette_core::prelude::*;

/// GET /info/about
pub async fn about<R: VignetteServices>(State(state): State<AppState<R>>) -> Json<About> {
    Json(About {
        about: state.config().about.clone(),
    })
}

/// GET /info/license
pub async fn license<R: VignetteServices>(State(state): State<AppState<R>>) -> Json<License> {
    Json(License {
        license: state.config().license.clone(),
    })
}
