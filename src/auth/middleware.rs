use crate::auth::auth::AuthUser;
use crate::auth::jwt::{SESSION_COOKIE, encode_session, touch, verify_token};
use crate::auth::session::{RevokedSessions, session_cookie};
use crate::config::Config;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use tracing::{debug, error};

/// Resolves the session cookie into an [`AuthUser`] request extension and
/// slides the session expiry forward on every request made with a live session.
///
/// Never rejects: the role guard decides what an anonymous request may reach.
pub async fn session_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let revoked = req.app_data::<Data<RevokedSessions>>().cloned();

    let claims = req
        .cookie(SESSION_COOKIE)
        .and_then(|cookie| match verify_token(cookie.value(), &config.session_secret) {
            Ok(c) => Some(c),
            Err(e) => {
                debug!(error = %e, "Ignoring invalid or expired session");
                None
            }
        })
        .filter(|c| {
            let ended = revoked.as_ref().is_some_and(|r| r.is_revoked(&c.jti));
            if ended {
                debug!(jti = %c.jti, "Ignoring revoked session");
            }
            !ended
        });

    if let Some(c) = &claims {
        req.extensions_mut().insert(AuthUser::from(c));
    }

    let mut res = next.call(req).await?;

    // Login and logout set the cookie themselves.
    let Some(c) = claims else { return Ok(res) };
    if res.response().cookies().any(|ck| ck.name() == SESSION_COOKIE) {
        return Ok(res);
    }

    match encode_session(&touch(&c, config.session_ttl), &config.session_secret) {
        Ok(token) => {
            if let Err(e) = res.response_mut().add_cookie(&session_cookie(token, &config)) {
                error!(error = %e, "Failed to refresh session cookie");
            }
        }
        Err(e) => error!(error = %e, "Failed to re-sign session"),
    }

    Ok(res)
}
