pub mod scopes {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const ADMIN: &str = "admin";
}

pub mod headers {
    /// Carries the internal presign secret of trusted callers.
    pub const INTERNAL_REQUEST: &str = "X-Internal-Request";
}

pub mod routes {
    pub const HEALTH: &str = "/health";

    pub const API_PREFIX: &str = "/api/v1";

    pub const INFO_ABOUT: &str = "/info/about";
    pub const INFO_LICENSE: &str = "/info/license";

    pub const CATEGORIES: &str = "/categories";
    pub const CATEGORY_BY_ID: &str = "/categories/{id}";
    pub const CATEGORY_ILLUSTRATIONS: &str = "/categories/{id}/illustrations";

    pub const PACKS: &str = "/packs";
    pub const PACK_BY_ID: &str = "/packs/{id}";
    pub const PACK_ILLUSTRATIONS: &str = "/packs/{id}/illustrations";
    pub const PACK_DOWNLOAD: &str = "/packs/{id}/download";

    pub const STYLES: &str = "/styles";
    pub const STYLE_BY_ID: &str = "/styles/{id}";
    pub const STYLE_ILLUSTRATIONS: &str = "/styles/{id}/illustrations";

    pub const ILLUSTRATIONS: &str = "/illustrations";
    pub const ILLUSTRATIONS_UPLOAD: &str = "/illustrations/upload";
    pub const ILLUSTRATION_BY_ID: &str = "/illustrations/{id}";
    pub const ILLUSTRATION_DOWNLOAD: &str = "/illustrations/{id}/download";
    pub const ILLUSTRATION_FILE: &str = "/illustrations/{id}/file";
    pub const ILLUSTRATION_PUBLIC: &str = "/illustrations/{id}/public";
    pub const FILE_BY_KEY: &str = "/illustrations/file/{key}";

    pub const SIGNED_ASSET: &str = "/i/{token}";

    /// Path of the public stream of a non-premium illustration.
    pub fn public_path(id: i64) -> String {
        format!("{API_PREFIX}/illustrations/{id}/public")
    }

    /// Path of the token-gated stream for a signed asset token.
    pub fn signed_path(token: &str) -> String {
        format!("{API_PREFIX}/i/{token}")
    }
}
