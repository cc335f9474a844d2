use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three groupings an illustration can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Taxonomy {
    Category,
    Pack,
    Style,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 3] = [Taxonomy::Category, Taxonomy::Pack, Taxonomy::Style];

    /// Singular, lowercase name used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Taxonomy::Category => "category",
            Taxonomy::Pack => "pack",
            Taxonomy::Style => "style",
        }
    }

    /// Plural path segment under the API prefix, e.g. `categories`.
    pub fn segment(&self) -> &'static str {
        match self {
            Taxonomy::Category => "categories",
            Taxonomy::Pack => "packs",
            Taxonomy::Style => "styles",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A category, pack or style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Catalog record of an SVG file in the object store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Illustration {
    pub id: i64,
    pub title: String,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    /// User-facing file name, used for downloads and archive entries.
    pub file_name: String,
    /// Opaque object-store key. Never shown to clients.
    pub storage_key: String,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Fields of an illustration that is about to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIllustration {
    pub title: String,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    pub file_name: String,
    pub storage_key: String,
    pub is_premium: bool,
}

impl NewIllustration {
    /// Term references set on this illustration.
    pub fn term_refs(&self) -> impl Iterator<Item = (Taxonomy, i64)> {
        [
            (Taxonomy::Category, self.category_id),
            (Taxonomy::Pack, self.pack_id),
            (Taxonomy::Style, self.style_id),
        ]
        .into_iter()
        .filter_map(|(taxonomy, id)| id.map(|id| (taxonomy, id)))
    }
}

/// Narrows an illustration listing. Unset fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IllustrationFilter {
    pub category_id: Option<i64>,
    pub style_id: Option<i64>,
    pub pack_id: Option<i64>,
}

impl IllustrationFilter {
    /// Filter on the illustrations of a single term.
    pub fn by(taxonomy: Taxonomy, id: i64) -> Self {
        let mut filter = Self::default();
        match taxonomy {
            Taxonomy::Category => filter.category_id = Some(id),
            Taxonomy::Pack => filter.pack_id = Some(id),
            Taxonomy::Style => filter.style_id = Some(id),
        }
        filter
    }
}

/// Bytes of an object plus the content type it was stored with.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

/// URL-friendly slug of a name: lowercased, trimmed, spaces and underscores as `-`.
pub fn slugify(name: &str) -> String {
    name.trim().to_lowercase().replace([' ', '_'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("  Flat Line_Art "), "flat-line-art");
        assert_eq!(slugify("Outline"), "outline");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn filter_by_taxonomy_sets_one_field() {
        let filter = IllustrationFilter::by(Taxonomy::Pack, 7);
        assert_eq!(filter.pack_id, Some(7));
        assert_eq!(filter.category_id, None);
        assert_eq!(filter.style_id, None);
    }

    #[test]
    fn term_refs_skip_unset_ids() {
        let new = NewIllustration {
            title: "Rocket".into(),
            style_id: Some(3),
            category_id: None,
            pack_id: Some(1),
            file_name: "rocket.svg".into(),
            storage_key: "20240101-00ff00ff00ff00ff.svg".into(),
            is_premium: false,
        };

        let refs: Vec<_> = new.term_refs().collect();
        assert_eq!(refs, vec![(Taxonomy::Pack, 1), (Taxonomy::Style, 3)]);
    }
}
