//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use storefront_app::domain::identity::{CartIdentity, Caller};

use crate::identity::RequestIdentity;

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_identity(&mut self, identity: RequestIdentity);

    /// The cart owner: the signed in user, or else the anonymous session.
    fn cart_identity_or_401(&self) -> Result<CartIdentity, StatusError>;

    /// The signed in user.
    fn caller_or_401(&self) -> Result<Caller, StatusError>;

    /// The signed in user, who must be an administrator.
    fn admin_or_403(&self) -> Result<Caller, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_identity(&mut self, identity: RequestIdentity) {
        self.inject(identity);
    }

    fn cart_identity_or_401(&self) -> Result<CartIdentity, StatusError> {
        self.obtain::<RequestIdentity>()
            .ok()
            .and_then(RequestIdentity::cart_identity)
            .ok_or_else(|| StatusError::unauthorized().brief("Missing caller identity"))
    }

    fn caller_or_401(&self) -> Result<Caller, StatusError> {
        self.obtain::<RequestIdentity>()
            .ok()
            .and_then(RequestIdentity::caller)
            .ok_or_else(|| StatusError::unauthorized().brief("Sign in required"))
    }

    fn admin_or_403(&self) -> Result<Caller, StatusError> {
        let caller = self.caller_or_401()?;

        if !caller.is_admin() {
            return Err(StatusError::forbidden().brief("Administrator access required"));
        }

        Ok(caller)
    }
}
