//! # Vignette
//!
//! A catalogue and delivery server for SVG illustrations.
//!
//! Illustrations are grouped by category, pack and style. Metadata lives in a relational
//! catalog, file bytes live in an object store. Premium illustrations are only reachable
//! through short-lived signed asset tokens or presigned URLs.
//!
//! This crate serves as an entry point, re-exporting the core types and
//! optionally including server, client, catalog and storage implementations via feature flags.
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | **`server`** | Includes the Axum-based server implementation (`vignette_server`). |
//! | **`client`** | Includes the HTTP client (`vignette_client`) for tooling. |
//! | **`fs`** | Storage backend for the local filesystem (`vignette_fs`). |
//! | **`s3`** | Storage backend for S3 and MinIO (`vignette_s3`). |
//! | **`sqlite`** | SQLite catalog (`vignette_sqlite`). |
//! | **`mock_auth`** | Development and shared-key authentication providers (`vignette_auth_mock`). |
//!
//! ## Example: Custom Server
//!
//! ```toml
//! [dependencies]
//! vignette = { version = "0.1", features = ["server", "fs", "sqlite", "mock_auth"] }
//! ```
//!
//! ```rust,ignore
//! use vignette::prelude::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let services = CoreServices {
//!     storage: FileSystemStorage::new("./vignette_data"),
//!     catalog: SqliteCatalog::connect("sqlite://vignette.db?mode=rwc").await?,
//!     auth: AllowAllAuth,
//! };
//! let signer = AssetSigner::new("a-long-random-secret")?;
//!
//! let app = VignetteServer::default().build(services, signer);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub use vignette_core::*;

#[cfg(feature = "server")]
pub mod server {
    pub use vignette_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use vignette_client::*;
}

#[cfg(feature = "fs")]
pub mod fs {
    pub use vignette_fs::*;
}

#[cfg(feature = "s3")]
pub mod s3 {
    pub use vignette_s3::*;
}

#[cfg(feature = "sqlite")]
pub mod sqlite {
    pub use vignette_sqlite::*;
}

#[cfg(feature = "mock_auth")]
pub mod auth_mock {
    pub use vignette_auth_mock::*;
}

pub mod prelude {
    pub use vignette_core::prelude::*;

    #[cfg(feature = "server")]
    pub use vignette_server::prelude::*;

    #[cfg(feature = "client")]
    pub use vignette_client::VignetteClient;

    #[cfg(feature = "fs")]
    pub use vignette_fs::FileSystemStorage;

    #[cfg(feature = "s3")]
    pub use vignette_s3::S3Storage;

    #[cfg(feature = "sqlite")]
    pub use vignette_sqlite::SqliteCatalog;

    #[cfg(feature = "mock_auth")]
    pub use vignette_auth_mock::{AllowAllAuth, StaticTokenAuth};
}
