use anyhow::{Context, bail};
use clap::Args;
use rand::Rng;
use rand::distr::Alphanumeric;
use std::path::PathBuf;
use tracing::{info, warn};
use vignette_auth_mock::StaticTokenAuth;
use vignette_core::prelude::*;
use vignette_fs::FileSystemStorage;
use vignette_s3::{S3Config, S3Storage};
use vignette_server::prelude::*;
use vignette_sqlite::SqliteCatalog;

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// HMAC key for asset tokens. Required.
    #[arg(long, env = "ASSET_SIGNING_SECRET", hide_env_values = true)]
    signing_secret: Option<String>,

    /// Shared secret of internal callers that may receive presigned URLs
    #[arg(long, env = "INTERNAL_PRESIGN_SECRET", hide_env_values = true)]
    internal_presign_secret: Option<String>,

    /// Origin prepended to image URLs (e.g. "https://api.example.com")
    #[arg(long, env = "API_PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Presigned URL lifetime, clamped to 60..=3600
    #[arg(long, env = "PRESIGN_TTL_SECONDS", allow_negative_numbers = true)]
    presign_ttl_seconds: Option<i64>,

    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://vignette.db")]
    database_url: String,

    /// Bearer token with full write access
    #[arg(long, env = "VIGNETTE_ADMIN_TOKEN", hide_env_values = true)]
    admin_token: Option<String>,

    /// Keep files in a local directory instead of S3
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[arg(long, env = "S3_BUCKET", default_value = "illustrations")]
    s3_bucket: String,

    /// Endpoint override, e.g. "http://minio:9000"
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// Endpoint browsers use for presigned URLs
    #[arg(long, env = "S3_PUBLIC_ENDPOINT")]
    s3_public_endpoint: Option<String>,

    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    #[arg(long, env = "S3_ACCESS_KEY", hide_env_values = true)]
    s3_access_key: Option<String>,

    #[arg(long, env = "S3_SECRET_KEY", hide_env_values = true)]
    s3_secret_key: Option<String>,

    /// Prefix for every object key
    #[arg(long, env = "S3_PREFIX")]
    s3_prefix: Option<String>,
}

pub async fn run(args: ServeArgs) -> anyhow::Result<()> {
    let signer = match AssetSigner::new(args.signing_secret.clone().unwrap_or_default()) {
        Ok(signer) => signer,
        Err(e) => bail!("{e}. Generate one with `vignette generate-secret`."),
    };

    let catalog = SqliteCatalog::connect(&args.database_url)
        .await
        .context("Failed to open the catalog")?;

    let config = ServerConfig {
        public_base_url: args.public_base_url.clone(),
        presign_ttl: clamp_presign_ttl(args.presign_ttl_seconds),
        internal_presign_secret: args.internal_presign_secret.clone(),
        ..ServerConfig::default()
    };

    let auth = match args.admin_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => StaticTokenAuth::new(token),
        None => {
            let token: String = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(48)
                .map(char::from)
                .collect();
            warn!("VIGNETTE_ADMIN_TOKEN not set, generated a one-off admin token for this run");
            println!("🔑 Admin token for this run:\n\n    {token}\n");
            StaticTokenAuth::new(&token)
        }
    };

    match args.storage_dir.clone() {
        Some(dir) => {
            info!("Using file system storage at {dir:?}");
            let storage = FileSystemStorage::new(dir);
            listen(args.port, config, storage, catalog, auth, signer).await
        }
        None => {
            let storage = S3Storage::connect(S3Config {
                bucket: args.s3_bucket,
                endpoint: args.s3_endpoint,
                public_endpoint: args.s3_public_endpoint,
                region: args.s3_region,
                access_key: args.s3_access_key,
                secret_key: args.s3_secret_key,
                prefix: args.s3_prefix,
                ..S3Config::default()
            })
            .await;
            storage
                .ensure_bucket()
                .await
                .context("Object store unavailable")?;
            listen(args.port, config, storage, catalog, auth, signer).await
        }
    }
}

async fn listen<S: StorageBackend>(
    port: u16,
    config: ServerConfig,
    storage: S,
    catalog: SqliteCatalog,
    auth: StaticTokenAuth,
    signer: AssetSigner,
) -> anyhow::Result<()> {
    let services = CoreServices {
        storage,
        catalog,
        auth,
    };
    let app = VignetteServer::new(config).build(services, signer);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_to_start_without_a_signing_secret() {
        let args = ServeArgs {
            port: 0,
            signing_secret: None,
            internal_presign_secret: None,
            public_base_url: None,
            presign_ttl_seconds: None,
            database_url: "sqlite::memory:".into(),
            admin_token: None,
            storage_dir: None,
            s3_bucket: "illustrations".into(),
            s3_endpoint: None,
            s3_public_endpoint: None,
            s3_region: "us-east-1".into(),
            s3_access_key: None,
            s3_secret_key: None,
            s3_prefix: None,
        };

        let err = run(args).await.unwrap_err();
        assert!(err.to_string().contains(SECRET_ENV));
    }
}
