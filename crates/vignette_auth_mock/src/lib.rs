//! Simple [`AuthProvider`]s for development and small deployments.
//!
//! * [`AllowAllAuth`]: accepts any token. Tests and demos only!
//! * [`StaticTokenAuth`]: accepts a single shared admin token.

use sha2::{Digest, Sha256};
use tracing::debug;
use vignette_core::prelude::{scopes::*, *};

#[derive(Clone)]
pub struct AllowAllAuth;

impl AuthProvider for AllowAllAuth {
    async fn verify(&self, _token: &str) -> Result<User, AuthError> {
        Ok(User {
            id: "dev_user".to_string(),
            scopes: vec![ADMIN.to_string(), READ.to_string(), WRITE.to_string()],
        })
    }
}

/// Accepts exactly one bearer token and grants it the `admin` scope.
///
/// Only the SHA-256 digest of the token is kept in memory.
#[derive(Clone)]
pub struct StaticTokenAuth {
    digest: [u8; 32],
}

impl StaticTokenAuth {
    pub fn new(token: &str) -> Self {
        Self {
            digest: Sha256::digest(token.as_bytes()).into(),
        }
    }
}

impl AuthProvider for StaticTokenAuth {
    async fn verify(&self, token: &str) -> Result<User, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Missing);
        }

        // Digests have a fixed length, so the comparison does not leak the token length.
        let candidate: [u8; 32] = Sha256::digest(token.as_bytes()).into();
        if candidate != self.digest {
            debug!("Rejected static admin token");
            return Err(AuthError::Invalid);
        }

        Ok(User {
            id: "admin".to_string(),
            scopes: vec![ADMIN.to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_token_accepts_only_its_token() {
        let auth = StaticTokenAuth::new("s3cret");

        let user = auth.verify("s3cret").await.unwrap();
        assert_eq!(user.scopes, vec![ADMIN.to_string()]);

        assert!(matches!(auth.verify("nope").await, Err(AuthError::Invalid)));
        assert!(matches!(auth.verify("").await, Err(AuthError::Missing)));
    }

    #[tokio::test]
    async fn allow_all_grants_write() {
        let user = AllowAllAuth.verify("").await.unwrap();
        assert!(user.scopes.iter().any(|s| s == WRITE));
    }
}
