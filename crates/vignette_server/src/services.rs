use vignette_core::prelude::*;

/// Plain bundle of backends for [`crate::VignetteServer::build`].
#[derive(Clone)]
pub struct CoreServices<S, C, A> {
    pub storage: S,
    pub catalog: C,
    pub auth: A,
}

impl<S, C, A> VignetteServices for CoreServices<S, C, A>
where
    S: StorageBackend,
    C: Catalog,
    A: AuthProvider,
{
    type Storage = S;
    type Catalog = C;
    type Auth = A;

    fn storage(&self) -> &S {
        &self.storage
    }
    fn catalog(&self) -> &C {
        &self.catalog
    }
    fn auth(&self) -> &A {
        &self.auth
    }
}
