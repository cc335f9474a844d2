//! # Vignette Core
//!
//! Types and traits shared by the server, the backends and the client.
//!
//! - **[`Illustration`](model::Illustration)** and **[`Term`](model::Term)**: catalog records.
//!   Terms are categories, packs or styles, distinguished by [`Taxonomy`](model::Taxonomy).
//! - **[`StorageBackend`](traits::StorageBackend)**: Trait for object stores holding the SVG bytes (e.g., S3, Filesystem).
//! - **[`Catalog`](traits::Catalog)**: Trait for the relational metadata store.
//! - **[`AuthProvider`](traits::AuthProvider)**: Trait for verifying bearer tokens on mutating endpoints.

pub mod constants;
pub mod error;
pub mod model;
pub mod traits;

pub mod prelude {
    pub use super::constants::*;
    pub use super::error::*;
    pub use super::model::*;
    pub use super::traits::*;
}
