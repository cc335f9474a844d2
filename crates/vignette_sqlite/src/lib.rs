//! # Vignette SQLite Catalog
//!
//! Implements [`Catalog`] on top of an `sqlx` SQLite pool.
//!
//! The schema is created with `CREATE TABLE IF NOT EXISTS` when connecting.
//! Deletion is soft: rows get a `deleted_at` timestamp and disappear from lookups.
//!
//! ```no_run
//! use vignette_sqlite::SqliteCatalog;
//!
//! # async fn run() -> Result<(), vignette_core::error::CatalogError> {
//! let catalog = SqliteCatalog::connect("sqlite://vignette.db").await?;
//! # Ok(())
//! # }
//! ```

mod rows;

use chrono::Utc;
use rows::{IllustrationRow, TermRow};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, error, info};
use vignette_core::prelude::*;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE IF NOT EXISTS packs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE IF NOT EXISTS styles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    slug TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE TABLE IF NOT EXISTS illustrations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    style_id INTEGER REFERENCES styles(id),
    category_id INTEGER REFERENCES categories(id),
    pack_id INTEGER REFERENCES packs(id),
    file_name TEXT NOT NULL,
    storage_key TEXT NOT NULL UNIQUE,
    is_premium INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_illustrations_file_name ON illustrations(file_name);
"#;

const ILLUSTRATION_COLUMNS: &str = "id, title, style_id, category_id, pack_id, file_name, \
     storage_key, is_premium, created_at, updated_at, deleted_at";

fn table(taxonomy: Taxonomy) -> &'static str {
    match taxonomy {
        Taxonomy::Category => "categories",
        Taxonomy::Pack => "packs",
        Taxonomy::Style => "styles",
    }
}

fn db_err(err: sqlx::Error) -> CatalogError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return CatalogError::InvalidRequest("storage key is already catalogued".into());
        }
        if db.is_foreign_key_violation() {
            return CatalogError::InvalidRequest("referenced term does not exist".into());
        }
    }
    error!("Catalog query failed: {err:?}");
    CatalogError::System(err.to_string())
}

fn non_blank(name: &str) -> Result<&str, CatalogError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CatalogError::InvalidRequest("name must not be empty".into()));
    }
    Ok(name)
}

#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    /// Wraps an existing pool and makes sure the schema exists.
    pub async fn new(pool: SqlitePool) -> Result<Self, CatalogError> {
        sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_err)?;
        Ok(Self { pool })
    }

    /// Connects to a database URL such as `sqlite://vignette.db`, creating the file if missing.
    pub async fn connect(url: &str) -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(db_err)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        info!("Catalog connected: {url}");
        Self::new(pool).await
    }

    /// A private in-memory database, for tests and demos.
    ///
    /// Pinned to a single connection that never expires, since every SQLite
    /// connection to `:memory:` opens its own database.
    pub async fn in_memory() -> Result<Self, CatalogError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(db_err)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(db_err)?;

        Self::new(pool).await
    }

    async fn find_term_any(&self, taxonomy: Taxonomy, id: i64) -> Result<TermRow, CatalogError> {
        let sql = format!(
            "SELECT id, name, slug, created_at, updated_at, deleted_at FROM {} WHERE id = ?",
            table(taxonomy)
        );
        sqlx::query_as::<_, TermRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| CatalogError::NotFound(taxonomy.label().to_string()))
    }

    async fn find_illustration_any(&self, id: i64) -> Result<IllustrationRow, CatalogError> {
        let sql = format!("SELECT {ILLUSTRATION_COLUMNS} FROM illustrations WHERE id = ?");
        sqlx::query_as::<_, IllustrationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| CatalogError::NotFound("illustration".to_string()))
    }
}

impl Catalog for SqliteCatalog {
    async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>, CatalogError> {
        let sql = format!(
            "SELECT id, name, slug, created_at, updated_at, deleted_at FROM {} \
             WHERE deleted_at IS NULL ORDER BY id",
            table(taxonomy)
        );
        let rows = sqlx::query_as::<_, TermRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Term::from).collect())
    }

    async fn get_term(&self, taxonomy: Taxonomy, id: i64) -> Result<Term, CatalogError> {
        let row = self.find_term_any(taxonomy, id).await?;
        if row.deleted_at.is_some() {
            return Err(CatalogError::NotFound(taxonomy.label().to_string()));
        }
        Ok(row.into())
    }

    async fn create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term, CatalogError> {
        let name = non_blank(name)?;
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO {} (name, slug, created_at, updated_at) VALUES (?, ?, ?, ?) \
             RETURNING id, name, slug, created_at, updated_at, deleted_at",
            table(taxonomy)
        );

        let row = sqlx::query_as::<_, TermRow>(&sql)
            .bind(name)
            .bind(slugify(name))
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.into())
    }

    async fn rename_term(
        &self,
        taxonomy: Taxonomy,
        id: i64,
        name: &str,
    ) -> Result<Term, CatalogError> {
        let name = non_blank(name)?;
        let sql = format!(
            "UPDATE {} SET name = ?, slug = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL \
             RETURNING id, name, slug, created_at, updated_at, deleted_at",
            table(taxonomy)
        );

        sqlx::query_as::<_, TermRow>(&sql)
            .bind(name)
            .bind(slugify(name))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(Term::from)
            .ok_or_else(|| CatalogError::NotFound(taxonomy.label().to_string()))
    }

    async fn soft_delete_term(&self, taxonomy: Taxonomy, id: i64) -> Result<Term, CatalogError> {
        let now = Utc::now();
        let sql = format!(
            "UPDATE {} SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
            table(taxonomy)
        );
        let result = sqlx::query(&sql)
            .bind(now)
            .bind(now)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            debug!(id, taxonomy = %taxonomy, "Term missing or already deleted");
        }

        // Read back so every caller sees the stored timestamp.
        Ok(self.find_term_any(taxonomy, id).await?.into())
    }

    async fn list_illustrations(
        &self,
        filter: IllustrationFilter,
    ) -> Result<Vec<Illustration>, CatalogError> {
        let sql = format!(
            "SELECT {ILLUSTRATION_COLUMNS} FROM illustrations \
             WHERE deleted_at IS NULL \
             AND (?1 IS NULL OR category_id = ?1) \
             AND (?2 IS NULL OR style_id = ?2) \
             AND (?3 IS NULL OR pack_id = ?3) \
             ORDER BY id"
        );

        let rows = sqlx::query_as::<_, IllustrationRow>(&sql)
            .bind(filter.category_id)
            .bind(filter.style_id)
            .bind(filter.pack_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(rows.into_iter().map(Illustration::from).collect())
    }

    async fn get_illustration(&self, id: i64) -> Result<Illustration, CatalogError> {
        let row = self.find_illustration_any(id).await?;
        if row.deleted_at.is_some() {
            return Err(CatalogError::NotFound("illustration".to_string()));
        }
        Ok(row.into())
    }

    async fn create_illustration(
        &self,
        new: NewIllustration,
    ) -> Result<Illustration, CatalogError> {
        let title = non_blank(&new.title)?;
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO illustrations \
             (title, style_id, category_id, pack_id, file_name, storage_key, is_premium, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {ILLUSTRATION_COLUMNS}"
        );

        let row = sqlx::query_as::<_, IllustrationRow>(&sql)
            .bind(title)
            .bind(new.style_id)
            .bind(new.category_id)
            .bind(new.pack_id)
            .bind(&new.file_name)
            .bind(&new.storage_key)
            .bind(new.is_premium)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(row.into())
    }

    async fn soft_delete_illustration(&self, id: i64) -> Result<Illustration, CatalogError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE illustrations SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        if result.rows_affected() == 0 {
            debug!(id, "Illustration missing or already deleted");
        }

        Ok(self.find_illustration_any(id).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_illustration(key: &str) -> NewIllustration {
        NewIllustration {
            title: "Rocket".into(),
            style_id: None,
            category_id: None,
            pack_id: None,
            file_name: "rocket.svg".into(),
            storage_key: key.into(),
            is_premium: false,
        }
    }

    #[tokio::test]
    async fn term_lifecycle() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();

        let term = catalog
            .create_term(Taxonomy::Category, " Space Travel ")
            .await
            .unwrap();
        assert_eq!(term.name, "Space Travel");
        assert_eq!(term.slug, "space-travel");
        assert!(term.deleted_at.is_none());

        let renamed = catalog
            .rename_term(Taxonomy::Category, term.id, "Deep_Space")
            .await
            .unwrap();
        assert_eq!(renamed.slug, "deep-space");

        let listed = catalog.list_terms(Taxonomy::Category).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(catalog.list_terms(Taxonomy::Pack).await.unwrap().is_empty());

        let deleted = catalog
            .soft_delete_term(Taxonomy::Category, term.id)
            .await
            .unwrap();
        let stamp = deleted.deleted_at.unwrap();

        let again = catalog
            .soft_delete_term(Taxonomy::Category, term.id)
            .await
            .unwrap();
        assert_eq!(again.deleted_at, Some(stamp));

        assert!(catalog.list_terms(Taxonomy::Category).await.unwrap().is_empty());
        assert!(matches!(
            catalog.get_term(Taxonomy::Category, term.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.rename_term(Taxonomy::Category, term.id, "x").await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_deletes_agree_on_the_timestamp() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let term = catalog.create_term(Taxonomy::Pack, "Starter").await.unwrap();
        let illustration = catalog
            .create_illustration(new_illustration("a.svg"))
            .await
            .unwrap();

        let (first, second) = tokio::join!(
            catalog.soft_delete_term(Taxonomy::Pack, term.id),
            catalog.soft_delete_term(Taxonomy::Pack, term.id),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(first.deleted_at.is_some());
        assert_eq!(first.deleted_at, second.deleted_at);
        let stored = catalog
            .soft_delete_term(Taxonomy::Pack, term.id)
            .await
            .unwrap();
        assert_eq!(stored.deleted_at, first.deleted_at);

        let (first, second) = tokio::join!(
            catalog.soft_delete_illustration(illustration.id),
            catalog.soft_delete_illustration(illustration.id),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(first.deleted_at.is_some());
        assert_eq!(first.deleted_at, second.deleted_at);
        assert_eq!(first.updated_at, second.updated_at);
    }

    #[tokio::test]
    async fn deleting_a_missing_record_is_not_found() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        assert!(matches!(
            catalog.soft_delete_term(Taxonomy::Style, 42).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.soft_delete_illustration(42).await,
            Err(CatalogError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn blank_names_are_rejected() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        assert!(matches!(
            catalog.create_term(Taxonomy::Style, "   ").await,
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn illustrations_filter_and_soft_delete() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let pack = catalog.create_term(Taxonomy::Pack, "Starter").await.unwrap();
        let style = catalog.create_term(Taxonomy::Style, "Flat").await.unwrap();

        let mut in_pack = new_illustration("k1.svg");
        in_pack.pack_id = Some(pack.id);
        in_pack.style_id = Some(style.id);
        in_pack.is_premium = true;
        let a = catalog.create_illustration(in_pack).await.unwrap();
        let b = catalog
            .create_illustration(new_illustration("k2.svg"))
            .await
            .unwrap();

        assert!(a.is_premium);
        assert_eq!(a.pack_id, Some(pack.id));

        let all = catalog
            .list_illustrations(IllustrationFilter::default())
            .await
            .unwrap();
        assert_eq!(all.iter().map(|i| i.id).collect::<Vec<_>>(), vec![a.id, b.id]);

        let by_pack = catalog
            .list_illustrations(IllustrationFilter::by(Taxonomy::Pack, pack.id))
            .await
            .unwrap();
        assert_eq!(by_pack.len(), 1);
        assert_eq!(by_pack[0].storage_key, "k1.svg");

        let by_style = catalog
            .list_illustrations(IllustrationFilter::by(Taxonomy::Style, style.id))
            .await
            .unwrap();
        assert_eq!(by_style.len(), 1);

        catalog.soft_delete_illustration(a.id).await.unwrap();
        assert!(matches!(
            catalog.get_illustration(a.id).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(
            catalog
                .list_illustrations(IllustrationFilter::by(Taxonomy::Pack, pack.id))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn duplicate_storage_key_is_invalid() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        catalog
            .create_illustration(new_illustration("same.svg"))
            .await
            .unwrap();

        assert!(matches!(
            catalog.create_illustration(new_illustration("same.svg")).await,
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn unknown_term_reference_is_invalid() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        let mut new = new_illustration("k.svg");
        new.category_id = Some(42);

        assert!(matches!(
            catalog.create_illustration(new).await,
            Err(CatalogError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let catalog = SqliteCatalog::in_memory().await.unwrap();
        assert!(matches!(
            catalog.get_illustration(1).await,
            Err(CatalogError::NotFound(_))
        ));
        assert!(matches!(
            catalog.soft_delete_term(Taxonomy::Pack, 1).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
