use crate::config::ServerConfig;
use crate::signing::AssetSigner;
use std::sync::Arc;
use vignette_core::prelude::*;

#[derive(Clone)]
pub struct AppState<R: VignetteServices> {
    pub services: R,
    pub signer: AssetSigner,
    pub config: Arc<ServerConfig>,
}

impl<R: VignetteServices> AppState<R> {
    pub fn signer(&self) -> &AssetSigner {
        &self.signer
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl<R> VignetteServices for AppState<R>
where
    R: VignetteServices,
{
    type Storage = R::Storage;
    type Catalog = R::Catalog;
    type Auth = R::Auth;

    fn storage(&self) -> &Self::Storage {
        self.services.storage()
    }
    fn catalog(&self) -> &Self::Catalog {
        self.services.catalog()
    }
    fn auth(&self) -> &Self::Auth {
        self.services.auth()
    }
}
