use crate::error::*;
use crate::model::*;

use bytes::Bytes;
use std::time::Duration;

/// A trait for injecting object storage into the server.
///
/// Keys are opaque storage keys; backends never interpret them.
pub trait StorageBackend: Send + Sync + 'static + Clone {
    /// Stores an object, replacing any existing object under the same key.
    fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Reads an object. Returns [`StorageError::NotFound`] for unknown keys.
    fn get_object(&self, key: &str)
    -> impl Future<Output = Result<StoredObject, StorageError>> + Send;

    /// Checks if an object exists.
    fn exists(&self, key: &str) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Deletes an object. Deleting a missing object is not an error.
    fn delete_object(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Optional: Returns a time-limited URL for direct retrieval from the store.
    fn presign_get(
        &self,
        _key: &str,
        _ttl: Duration,
    ) -> impl Future<Output = Result<String, StorageError>> + Send {
        async {
            Err(StorageError::Unsupported(
                "Presigned URLs not supported by this backend".into(),
            ))
        }
    }
}

/// A trait for injecting the relational catalog into the server.
///
/// Soft-deleted records are invisible to every lookup and listing.
pub trait Catalog: Send + Sync + 'static + Clone {
    fn list_terms(
        &self,
        taxonomy: Taxonomy,
    ) -> impl Future<Output = Result<Vec<Term>, CatalogError>> + Send;

    fn get_term(
        &self,
        taxonomy: Taxonomy,
        id: i64,
    ) -> impl Future<Output = Result<Term, CatalogError>> + Send;

    fn create_term(
        &self,
        taxonomy: Taxonomy,
        name: &str,
    ) -> impl Future<Output = Result<Term, CatalogError>> + Send;

    /// Renames a term and regenerates its slug.
    fn rename_term(
        &self,
        taxonomy: Taxonomy,
        id: i64,
        name: &str,
    ) -> impl Future<Output = Result<Term, CatalogError>> + Send;

    /// Stamps `deleted_at`. Returns the stored timestamp when already deleted.
    fn soft_delete_term(
        &self,
        taxonomy: Taxonomy,
        id: i64,
    ) -> impl Future<Output = Result<Term, CatalogError>> + Send;

    fn list_illustrations(
        &self,
        filter: IllustrationFilter,
    ) -> impl Future<Output = Result<Vec<Illustration>, CatalogError>> + Send;

    fn get_illustration(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Illustration, CatalogError>> + Send;

    fn create_illustration(
        &self,
        new: NewIllustration,
    ) -> impl Future<Output = Result<Illustration, CatalogError>> + Send;

    /// Stamps `deleted_at`. Returns the stored timestamp when already deleted.
    fn soft_delete_illustration(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Illustration, CatalogError>> + Send;
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub scopes: Vec<String>,
}

/// A trait for injecting authentication logic into the server.
pub trait AuthProvider: Send + Sync + 'static + Clone {
    /// Verifies a bearer token and returns a User identity if successful.
    fn verify(&self, token: &str) -> impl Future<Output = Result<User, AuthError>> + Send;
}

/// Bundles the backends a server instance runs on.
pub trait VignetteServices: Send + Sync + 'static + Clone {
    type Storage: StorageBackend;
    type Catalog: Catalog;
    type Auth: AuthProvider;

    fn storage(&self) -> &Self::Storage;
    fn catalog(&self) -> &Self::Catalog;
    fn auth(&self) -> &Self::Auth;
}
