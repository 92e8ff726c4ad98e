use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::roles::RoleKind;
use crate::auth::token::Claims;
use crate::error::AppError;

/// The caller's verified identity, taken from the claims `AuthMiddleware` stored.
///
/// Handlers for mutating operations call [`AuthenticatedUser::require_role`] or
/// [`AuthenticatedUser::require_any_role`] first thing, so the gate each one
/// applies is visible at the top of the handler.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn id(&self) -> i64 {
        self.0.sub
    }

    /// The role named in the token, if it is one the gates understand.
    pub fn role(&self) -> Option<RoleKind> {
        RoleKind::from_name(&self.0.role)
    }

    pub fn require_role(&self, required: RoleKind) -> Result<(), AppError> {
        self.require_any_role(&[required])
    }

    /// Fails with `Forbidden` unless the token's role is one of `allowed`.
    pub fn require_any_role(&self, allowed: &[RoleKind]) -> Result<(), AppError> {
        match self.role() {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => {
                log::warn!(
                    "User {} with role {:?} denied; requires one of {:?}",
                    self.0.sub,
                    self.0.role,
                    allowed
                );
                Err(AppError::Forbidden("Unauthorized access".into()))
            }
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedUser(claims))),
            None => {
                let err = AppError::Unauthorized(
                    "Credentials not found in request. Ensure AuthMiddleware is active.".to_string(),
                );
                ready(Err(err.into()))
            }
        }
    }
}
