//! Response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;
use vignette_core::model::{Illustration, Term};

/// `{"data": ...}` envelope of list and detail responses.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// An illustration as clients see it: no storage key, a resolved image URL instead.
#[derive(Debug, Serialize)]
pub struct IllustrationView {
    pub id: i64,
    pub title: String,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    pub file_name: String,
    pub is_premium: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IllustrationView {
    pub fn new(illustration: Illustration, image_url: String) -> Self {
        Self {
            id: illustration.id,
            title: illustration.title,
            style_id: illustration.style_id,
            category_id: illustration.category_id,
            pack_id: illustration.pack_id,
            file_name: illustration.file_name,
            is_premium: illustration.is_premium,
            image_url,
            created_at: illustration.created_at,
            updated_at: illustration.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TermView {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Term> for TermView {
    fn from(term: Term) -> Self {
        Self {
            id: term.id,
            name: term.name,
            slug: term.slug,
            created_at: term.created_at,
            updated_at: term.updated_at,
        }
    }
}

/// Result of a soft delete.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct FileUrls {
    pub url: String,
    pub expires_in: u64,
    pub signed_url: String,
}

#[derive(Debug, Serialize)]
pub struct DownloadUrl {
    pub download_url: String,
}

#[derive(Debug, Serialize)]
pub struct About {
    pub about: String,
}

#[derive(Debug, Serialize)]
pub struct License {
    pub license: String,
}
