use chrono::{DateTime, Utc};
use vignette_core::model::{Illustration, Term};

#[derive(sqlx::FromRow)]
pub(crate) struct TermRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<TermRow> for Term {
    fn from(row: TermRow) -> Self {
        Term {
            id: row.id,
            name: row.name,
            slug: row.slug,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct IllustrationRow {
    pub id: i64,
    pub title: String,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    pub file_name: String,
    pub storage_key: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<IllustrationRow> for Illustration {
    fn from(row: IllustrationRow) -> Self {
        Illustration {
            id: row.id,
            title: row.title,
            style_id: row.style_id,
            category_id: row.category_id,
            pack_id: row.pack_id,
            file_name: row.file_name,
            storage_key: row.storage_key,
            is_premium: row.is_premium,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}
