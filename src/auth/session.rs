use crate::config::Config;
use crate::auth::jwt::SESSION_COOKIE;
use actix_web::cookie::{Cookie, SameSite, time};
use moka::future::Cache;
use std::time::Duration;

/// Sessions ended by an explicit logout. Entries only need to outlive the
/// inactivity window: past it the token is expired anyway.
#[derive(Clone)]
pub struct RevokedSessions {
    cache: Cache<String, ()>,
}

impl RevokedSessions {
    pub fn new(session_ttl: usize) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(Duration::from_secs(session_ttl as u64))
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.cache.contains_key(jti)
    }
}

pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.cookie_secure)
        .max_age(time::Duration::seconds(config.session_ttl as i64))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
