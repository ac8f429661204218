use crate::{error::AppError, model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

/// Identity of the caller for the current request. Placed in the request
/// extensions by the session middleware; extracting it from an anonymous
/// request sends the caller to the login page.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,

    /// Present only if this account is linked to an intern record
    pub intern_id: Option<i64>,
}

impl From<&Claims> for AuthUser {
    fn from(claims: &Claims) -> Self {
        AuthUser {
            user_id: claims.user_id,
            username: claims.sub.clone(),
            role: claims.role,
            intern_id: claims.intern_id,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or(AppError::Unauthenticated),
        )
    }
}

impl AuthUser {
    /// Wrong-role callers are sent back to their own landing page.
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden {
                landing: self.role.landing_page(),
            })
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require(Role::Admin)
    }

    pub fn require_intern(&self) -> Result<(), AppError> {
        self.require(Role::User)
    }

    /// The intern record this account reports attendance for.
    pub fn linked_intern(&self) -> Result<i64, AppError> {
        self.intern_id
            .ok_or_else(|| AppError::NotFound("Profil stagiaire introuvable.".into()))
    }
}
