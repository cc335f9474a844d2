use std::time::Duration;

/// Default lifetime of presigned URLs returned to trusted callers.
pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(600);
const MIN_PRESIGN_TTL_SECS: i64 = 60;
const MAX_PRESIGN_TTL_SECS: i64 = 3600;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Absolute origin prepended to generated paths, e.g. `https://api.example.com`.
    ///
    /// Image URLs stay relative when unset.
    pub public_base_url: Option<String>,
    /// Lifetime of the signed asset tokens embedded in premium image URLs.
    ///
    /// Defaults to 15 minutes.
    pub asset_token_ttl: Duration,
    /// Lifetime of presigned object-store URLs. See [`clamp_presign_ttl`].
    pub presign_ttl: Duration,
    /// Lifetime of the URL returned by the download endpoint.
    ///
    /// Defaults to 1 hour.
    pub download_url_ttl: Duration,
    /// Value trusted callers send in `X-Internal-Request` to receive presigned URLs.
    ///
    /// Presigned URLs are never included in responses when unset.
    pub internal_presign_secret: Option<String>,
    /// Upper bound for request bodies, including multipart uploads.
    pub max_upload_bytes: usize,
    pub about: String,
    pub license: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            asset_token_ttl: Duration::from_secs(15 * 60),
            presign_ttl: DEFAULT_PRESIGN_TTL,
            download_url_ttl: Duration::from_secs(60 * 60),
            internal_presign_secret: None,
            max_upload_bytes: 10 * 1024 * 1024,
            about: "Vignette serves an open catalogue of SVG illustrations.".to_string(),
            license: "All illustrations are free to use under the MIT license.".to_string(),
        }
    }
}

impl ServerConfig {
    /// Prefixes a relative `path` with [`ServerConfig::public_base_url`], if any.
    ///
    /// Absolute `http(s)` URLs are returned unchanged.
    pub fn public_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match self.public_base_url.as_deref() {
            Some(base) if !base.is_empty() => format!("{}{path}", base.trim_end_matches('/')),
            _ => path.to_string(),
        }
    }
}

/// Presign lifetime from a raw `PRESIGN_TTL_SECONDS` value.
///
/// Unset or non-positive values use the 600 second default, everything else is clamped to `[60, 3600]`.
pub fn clamp_presign_ttl(seconds: Option<i64>) -> Duration {
    match seconds {
        Some(secs) if secs > 0 => {
            let secs = secs.clamp(MIN_PRESIGN_TTL_SECS, MAX_PRESIGN_TTL_SECS);
            Duration::from_secs(secs.unsigned_abs())
        }
        _ => DEFAULT_PRESIGN_TTL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presign_ttl_is_clamped() {
        assert_eq!(clamp_presign_ttl(None), Duration::from_secs(600));
        assert_eq!(clamp_presign_ttl(Some(0)), Duration::from_secs(600));
        assert_eq!(clamp_presign_ttl(Some(-5)), Duration::from_secs(600));
        assert_eq!(clamp_presign_ttl(Some(10)), Duration::from_secs(60));
        assert_eq!(clamp_presign_ttl(Some(900)), Duration::from_secs(900));
        assert_eq!(clamp_presign_ttl(Some(86_400)), Duration::from_secs(3600));
    }

    #[test]
    fn public_url_joins_base() {
        let mut config = ServerConfig::default();
        assert_eq!(config.public_url("/api/v1/i/x"), "/api/v1/i/x");

        config.public_base_url = Some("https://api.example.com/".into());
        assert_eq!(
            config.public_url("/api/v1/i/x"),
            "https://api.example.com/api/v1/i/x"
        );
        assert_eq!(
            config.public_url("https://cdn.example.com/a.svg?sig=1"),
            "https://cdn.example.com/a.svg?sig=1"
        );
    }
}
