//! # Vignette Client
//!
//! A small async HTTP client for the Vignette API, used by the `vignette` CLI.
//!
//! ```no_run
//! use vignette_client::VignetteClient;
//! use vignette_core::model::IllustrationFilter;
//!
//! # async fn run() -> vignette_client::Result<()> {
//! let client = VignetteClient::new("http://localhost:3000", None);
//! for illustration in client.list_illustrations(IllustrationFilter::default()).await? {
//!     println!("{} {}", illustration.id, illustration.image_url);
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use reqwest::{Client, Response, StatusCode, multipart};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::path::Path;
use thiserror::Error;
use vignette_core::prelude::{routes::API_PREFIX, *};

#[derive(Error, Debug)]
pub enum VignetteClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned error {0}: {1}")]
    ServerError(StatusCode, String),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, VignetteClientError>;

/// An illustration as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct IllustrationInfo {
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

#[derive(Debug, Clone, Deserialize)]
pub struct Deleted {
    pub id: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Optional fields of an upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Name shown to users. Defaults to the local file name.
    pub file_name: Option<String>,
    pub style_id: Option<i64>,
    pub category_id: Option<i64>,
    pub pack_id: Option<i64>,
    pub is_premium: bool,
}

/// A downloaded pack archive.
#[derive(Debug, Clone)]
pub struct PackArchive {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct TermInput<'a> {
    name: &'a str,
}

#[derive(Deserialize)]
struct DownloadUrl {
    download_url: String,
}

#[derive(Clone)]
pub struct VignetteClient {
    base_url: String,
    client: Client,
    token: Option<String>,
}

impl VignetteClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
            token,
        }
    }

    fn auth_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            builder.header("Authorization", format!("Bearer {token}"))
        } else {
            builder
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    /// Resolves a URL returned by the server, which may be relative to the API origin.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{url}", self.base_url)
        }
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(VignetteClientError::ServerError(status, message))
    }

    async fn data<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body: Data<T> = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| VignetteClientError::Validation(format!("Failed to parse response: {e}")))?;
        Ok(body.data)
    }

    pub async fn list_illustrations(
        &self,
        filter: IllustrationFilter,
    ) -> Result<Vec<IllustrationInfo>> {
        let mut query = Vec::new();
        if let Some(id) = filter.category_id {
            query.push(("category_id", id));
        }
        if let Some(id) = filter.style_id {
            query.push(("style_id", id));
        }
        if let Some(id) = filter.pack_id {
            query.push(("pack_id", id));
        }

        let response = self
            .client
            .get(self.api("/illustrations"))
            .query(&query)
            .send()
            .await?;
        Self::data(response).await
    }

    pub async fn get_illustration(&self, id: i64) -> Result<IllustrationInfo> {
        let response = self
            .client
            .get(self.api(&format!("/illustrations/{id}")))
            .send()
            .await?;
        Self::data(response).await
    }

    /// Uploads a local SVG file as a new illustration.
    pub async fn upload_illustration(
        &self,
        path: &Path,
        title: &str,
        options: UploadOptions,
    ) -> Result<IllustrationInfo> {
        let local_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| VignetteClientError::Validation("Path has no file name".into()))?
            .to_string();
        let data = tokio::fs::read(path).await?;

        let part = multipart::Part::bytes(data)
            .file_name(local_name.clone())
            .mime_str("image/svg+xml")?;
        let mut form = multipart::Form::new()
            .text("title", title.to_string())
            .text("file_name", options.file_name.unwrap_or(local_name))
            .text("is_premium", options.is_premium.to_string());
        for (field, value) in [
            ("style_id", options.style_id),
            ("category_id", options.category_id),
            ("pack_id", options.pack_id),
        ] {
            if let Some(id) = value {
                form = form.text(field, id.to_string());
            }
        }
        let form = form.part("file", part);

        let response = self
            .auth_request(self.client.post(self.api("/illustrations/upload")))
            .multipart(form)
            .send()
            .await?;
        Self::data(response).await
    }

    pub async fn delete_illustration(&self, id: i64) -> Result<Deleted> {
        let response = self
            .auth_request(self.client.delete(self.api(&format!("/illustrations/{id}"))))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Presigned download URL, valid for an hour.
    pub async fn download_url(&self, id: i64) -> Result<String> {
        let response = self
            .client
            .get(self.api(&format!("/illustrations/{id}/download")))
            .send()
            .await?;
        let body: DownloadUrl = Self::check(response).await?.json().await?;
        Ok(body.download_url)
    }

    /// Fetches image bytes from an `image_url`, e.g. a signed `/api/v1/i/{token}` path.
    pub async fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(self.resolve(image_url)).send().await?;
        let bytes = Self::check(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub async fn list_terms(&self, taxonomy: Taxonomy) -> Result<Vec<Term>> {
        let response = self
            .client
            .get(self.api(&format!("/{}", taxonomy.segment())))
            .send()
            .await?;
        Self::data(response).await
    }

    pub async fn create_term(&self, taxonomy: Taxonomy, name: &str) -> Result<Term> {
        let response = self
            .auth_request(
                self.client
                    .post(self.api(&format!("/{}", taxonomy.segment()))),
            )
            .json(&TermInput { name })
            .send()
            .await?;
        Self::data(response).await
    }

    pub async fn rename_term(&self, taxonomy: Taxonomy, id: i64, name: &str) -> Result<Term> {
        let response = self
            .auth_request(
                self.client
                    .put(self.api(&format!("/{}/{id}", taxonomy.segment()))),
            )
            .json(&TermInput { name })
            .send()
            .await?;
        Self::data(response).await
    }

    pub async fn delete_term(&self, taxonomy: Taxonomy, id: i64) -> Result<Deleted> {
        let response = self
            .auth_request(
                self.client
                    .delete(self.api(&format!("/{}/{id}", taxonomy.segment()))),
            )
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Downloads a pack as a zip archive, named the way the server suggests.
    pub async fn download_pack(&self, id: i64) -> Result<PackArchive> {
        let response = self
            .client
            .get(self.api(&format!("/packs/{id}/download")))
            .send()
            .await?;
        let response = Self::check(response).await?;

        let file_name = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_name)
            .unwrap_or_else(|| format!("pack-{id}.zip"));
        let data = response.bytes().await?.to_vec();

        Ok(PackArchive { file_name, data })
    }
}

/// File name of an `attachment; filename=...` header, without any directory part.
fn attachment_name(disposition: &str) -> Option<String> {
    let raw = disposition
        .split(';')
        .map(str::trim)
        .find_map(|p| p.strip_prefix("filename="))?;
    let name = raw.trim_matches('"');
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_urls() {
        let client = VignetteClient::new("http://localhost:3000/", None);
        assert_eq!(
            client.resolve("/api/v1/i/abc"),
            "http://localhost:3000/api/v1/i/abc"
        );
        assert_eq!(
            client.resolve("https://cdn.example.com/a.svg"),
            "https://cdn.example.com/a.svg"
        );
        assert_eq!(
            client.api("/packs"),
            "http://localhost:3000/api/v1/packs"
        );
    }

    #[test]
    fn parses_attachment_names() {
        assert_eq!(
            attachment_name("attachment; filename=pack-space-1-20240101.zip").as_deref(),
            Some("pack-space-1-20240101.zip")
        );
        assert_eq!(
            attachment_name("attachment; filename=\"../../evil.zip\"").as_deref(),
            Some("evil.zip")
        );
        assert_eq!(attachment_name("inline"), None);
    }
}
