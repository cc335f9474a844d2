//! Signed asset tokens.
//!
//! A token grants read access to one object until its expiry, without any server-side state:
//!
//! ```text
//! base64url( storage_key "|" expiry "|" base64url(HMAC-SHA256(secret, storage_key "." expiry)) )
//! ```
//!
//! Both encodings are unpadded URL-safe base64 and `expiry` is a decimal Unix timestamp in seconds.
//! There is no revocation: a token stays valid until its expiry second has passed.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use vignette_core::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Environment variable holding the signing secret.
pub const SECRET_ENV: &str = "ASSET_SIGNING_SECRET";

const FIELD_SEPARATOR: char = '|';

#[derive(Clone)]
pub struct AssetSigner {
    secret: Arc<[u8]>,
}

impl fmt::Debug for AssetSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetSigner")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl AssetSigner {
    /// - `secret`: HMAC key shared by every server instance.
    ///
    /// Fails with [`TokenError::Configuration`] when the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::Configuration(format!("{SECRET_ENV} not set")));
        }
        Ok(Self {
            secret: Arc::from(secret),
        })
    }

    /// Mints a token for `storage_key` that expires `ttl` from now.
    pub fn issue(&self, storage_key: &str, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(storage_key, ttl, Utc::now().timestamp())
    }

    /// Like [`AssetSigner::issue`], with `now` given in Unix seconds.
    pub fn issue_at(&self, storage_key: &str, ttl: Duration, now: i64) -> Result<String, TokenError> {
        if storage_key.is_empty() {
            return Err(TokenError::Malformed("empty storage key"));
        }
        if storage_key.contains(FIELD_SEPARATOR) {
            return Err(TokenError::Malformed("storage key contains '|'"));
        }

        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expiry = now.saturating_add(ttl).to_string();
        let signature = self.mac(storage_key, &expiry)?.finalize().into_bytes();

        let payload = format!(
            "{storage_key}{FIELD_SEPARATOR}{expiry}{FIELD_SEPARATOR}{}",
            URL_SAFE_NO_PAD.encode(signature)
        );
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Checks a token and returns the storage key it grants access to.
    ///
    /// Whether the object exists is up to the caller.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// Like [`AssetSigner::validate`], with `now` given in Unix seconds.
    pub fn validate_at(&self, token: &str, now: i64) -> Result<String, TokenError> {
        let decoded = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| TokenError::Malformed("invalid token encoding"))?;
        let payload =
            String::from_utf8(decoded).map_err(|_| TokenError::Malformed("invalid token encoding"))?;

        let mut fields = payload.split(FIELD_SEPARATOR);
        let (Some(storage_key), Some(expiry), Some(signature), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(TokenError::Malformed("invalid token parts"));
        };

        let expires_at: i64 = expiry
            .parse()
            .map_err(|_| TokenError::Malformed("invalid expiry"))?;
        if now > expires_at {
            return Err(TokenError::Expired);
        }

        // The MAC is recomputed over the expiry string as transmitted, not a re-formatted integer.
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        self.mac(storage_key, expiry)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::InvalidSignature)?;

        Ok(storage_key.to_string())
    }

    fn mac(&self, storage_key: &str, expiry: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::Configuration(e.to_string()))?;
        mac.update(storage_key.as_bytes());
        mac.update(b".");
        mac.update(expiry.as_bytes());
        Ok(mac)
    }
}
