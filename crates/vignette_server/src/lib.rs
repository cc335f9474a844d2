//! # Vignette Server
//!
//! An Axum-based REST API for a catalogue of SVG illustrations.
//!
//! Provides the [`VignetteServer`] builder, which ties together an object store, a catalog and an
//! authentication provider, plus the [`AssetSigner`](signing::AssetSigner) that gates premium files.
//!
//! ## Permissions
//!
//! Reads are public. Authentication providers must grant one of the following scopes in their
//! `User` object to change the catalogue:
//!
//! * **`write`**: create, rename, delete and upload.
//! * **`admin`**: Full access.
//!
//! ## Premium illustrations
//!
//! Premium files are never served on their public route. Listings point at
//! `/api/v1/i/{token}` instead, where `token` is a short-lived HMAC-signed asset token.
//! Trusted callers presenting the internal secret can ask for presigned object-store URLs.
//!
//! ## Example
//!
//! ```no_run
//! use vignette_server::prelude::*;
//! use vignette_fs::FileSystemStorage;
//! use vignette_sqlite::SqliteCatalog;
//! use vignette_auth_mock::AllowAllAuth;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = CoreServices {
//!     storage: FileSystemStorage::new("./illustrations"),
//!     catalog: SqliteCatalog::in_memory().await?,
//!     auth: AllowAllAuth,
//! };
//! let signer = AssetSigner::new("change-me")?;
//!
//! let app = VignetteServer::default().build(services, signer);
//! # Ok(())
//! # }
//! ```

mod api;
mod archive;
mod server;

pub mod auth;
pub mod config;
pub mod services;
pub mod signing;
pub mod state;
pub mod views;

pub use server::VignetteServer;

pub mod prelude {
    pub use crate::VignetteServer;
    pub use crate::auth::*;
    pub use crate::config::*;
    pub use crate::services::*;
    pub use crate::signing::*;
    pub use crate::state::*;
}
