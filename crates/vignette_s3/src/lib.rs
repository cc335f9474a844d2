//! # Vignette S3 Storage
//!
//! Object storage on AWS S3 or any S3-compatible server such as MinIO.
//!
//! Presigned URLs can be produced by a second client pointing at a public endpoint,
//! for deployments where the server reaches the store on an internal address
//! (e.g., `http://minio:9000`) but browsers must use another one.

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use vignette_core::prelude::*;

/// Connection settings for [`S3Storage::connect`].
#[derive(Clone, Debug)]
pub struct S3Config {
    pub bucket: String,
    /// Endpoint override, e.g. `http://minio:9000`. [`None`] uses AWS.
    pub endpoint: Option<String>,
    /// Endpoint used only for presigned URLs.
    pub public_endpoint: Option<String>,
    pub region: String,
    /// Static credentials. [`None`] falls back to the default AWS provider chain.
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Prefix prepended to every key, e.g. `illustrations/`.
    pub prefix: Option<String>,
    /// Required by MinIO.
    pub force_path_style: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "illustrations".to_string(),
            endpoint: None,
            public_endpoint: None,
            region: "us-east-1".to_string(),
            access_key: None,
            secret_key: None,
            prefix: None,
            force_path_style: true,
        }
    }
}

#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    presign_client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    pub fn new(client: Client, bucket: String, prefix: Option<String>) -> Self {
        Self {
            presign_client: client.clone(),
            client,
            bucket,
            prefix: prefix.unwrap_or_default(),
        }
    }

    /// Uses a separate client to sign download URLs.
    pub fn with_presign_client(mut self, client: Client) -> Self {
        self.presign_client = client;
        self
    }

    /// Builds the clients from an [`S3Config`].
    pub async fn connect(config: S3Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region));
        if let (Some(access_key), Some(secret_key)) = (config.access_key, config.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key, secret_key, None, None, "vignette",
            ));
        }
        let shared = loader.load().await;

        let client_for = |endpoint: Option<&String>| {
            let mut builder = aws_sdk_s3::config::Builder::from(&shared)
                .force_path_style(config.force_path_style);
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint_url(endpoint);
            }
            Client::from_conf(builder.build())
        };

        let client = client_for(config.endpoint.as_ref());
        let storage = Self::new(client, config.bucket, config.prefix);

        match config.public_endpoint.as_ref() {
            Some(public) => storage.with_presign_client(client_for(Some(public))),
            None => storage,
        }
    }

    /// Creates the bucket if it does not exist yet.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn ensure_bucket(&self) -> Result<(), StorageError> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                info!("Bucket already exists");
                Ok(())
            }
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => {
                self.client
                    .create_bucket()
                    .bucket(&self.bucket)
                    .send()
                    .await
                    .map_err(|e| {
                        error!("Failed to create bucket: {e:?}");
                        StorageError::System(format!("S3 Create Bucket Error: {e:?}"))
                    })?;
                info!("Bucket created");
                Ok(())
            }
            Err(e) => {
                error!("Failed to check bucket: {e:?}");
                Err(StorageError::System(format!("S3 Head Bucket Error: {e:?}")))
            }
        }
    }

    fn key(&self, key: &str) -> String {
        if self.prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}{key}", self.prefix)
        }
    }
}

impl StorageBackend for S3Storage {
    #[instrument(skip(self, data), fields(bucket = %self.bucket, key))]
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let key = self.key(key);
        tracing::Span::current().record("key", &key);

        debug!("Uploading object to S3...");
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object: {e:?}");
                StorageError::System(format!("S3 Upload Error: {e:?}"))
            })?;

        debug!("Upload successful");
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket, key))]
    async fn get_object(&self, key: &str) -> Result<StoredObject, StorageError> {
        let full_key = self.key(key);
        tracing::Span::current().record("key", &full_key);

        debug!("Reading object from S3...");
        let res = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await;

        match res {
            Ok(output) => {
                let content_type = output.content_type().map(str::to_string);
                let data = output.body.collect().await.map_err(|e| {
                    error!("Failed to stream body: {e:?}");
                    StorageError::System(format!("Failed to stream S3 body: {e}"))
                })?;
                Ok(StoredObject {
                    data: data.into_bytes(),
                    content_type,
                })
            }
            Err(SdkError::ServiceError(err)) => {
                let inner = err.err();
                if inner.is_no_such_key() {
                    debug!("Object not found in S3");
                    Err(StorageError::NotFound(key.to_string()))
                } else {
                    error!("S3 Service Error during read: {err:?}");
                    Err(StorageError::System(format!("S3 Service Error: {inner:?}")))
                }
            }
            Err(e) => {
                error!("Unexpected S3 Error: {e:?}");
                Err(StorageError::System(format!("S3 Error: {e:?}")))
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let key = self.key(key);
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(err)) if err.err().is_not_found() => Ok(false),
            Err(SdkError::ServiceError(err)) => {
                error!("S3 Head Object Error: {err:?}");
                Err(StorageError::System(format!("S3 Service Error: {err:?}")))
            }
            Err(e) => Err(StorageError::System(format!("S3 Error: {e}"))),
        }
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(self.key(key))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete object: {e:?}");
                StorageError::System(format!("S3 Delete Error: {e:?}"))
            })?;
        Ok(())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(ttl)
            .map_err(|e| StorageError::InvalidRequest(format!("Invalid presign TTL: {e}")))?;

        let request = self
            .presign_client
            .get_object()
            .bucket(&self.bucket)
            .key(self.key(key))
            .presigned(presigning)
            .await
            .map_err(|e| {
                error!("Failed to presign object: {e:?}");
                StorageError::System(format!("S3 Presign Error: {e:?}"))
            })?;

        Ok(request.uri().to_string())
    }
}
