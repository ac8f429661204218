#![allow(dead_code, unused_macros)]

use actix_web::{
    App,
    body::MessageBody,
    cookie::Cookie,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::from_fn,
    test::TestRequest,
    web::Data,
};
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::SqlitePool;
use stagiaires::{
    api::intern::{CreatedIntern, create_intern},
    auth::{
        jwt::SESSION_COOKIE, middleware::session_middleware, password::hash_password,
        session::RevokedSessions,
    },
    config::Config,
    db::init_db,
    model::role::Role,
    repo::{self, intern::InternFields},
    routes,
    utils::username_filter::UsernameFilter,
};
use std::net::SocketAddr;
use tempfile::TempDir;

pub const ADMIN: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// A fresh database in its own temp directory plus the shared state the
/// server would hold. The directory goes away with the value.
pub struct TestApp {
    pub pool: SqlitePool,
    pub config: Config,
    pub revoked: Data<RevokedSessions>,
    pub filter: Data<UsernameFilter>,
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let database_url = format!("sqlite://{}", dir.path().join("stagiaires.db").display());
        let pool = init_db(&database_url).await.expect("Failed to init test db");

        let config = Config {
            database_url,
            session_secret: "integration-test-secret-0123456789".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            session_ttl: 600,
            cookie_secure: false,
            rate_login_per_min: 1_000,
            rate_register_per_min: 1_000,
            workplace: "ANTANANARIVO".to_string(),
            log_dir: dir.path().display().to_string(),
        };

        let app = Self {
            pool,
            revoked: Data::new(RevokedSessions::new(config.session_ttl)),
            filter: Data::new(UsernameFilter::new()),
            config,
            _dir: dir,
        };
        app.seed_admin().await;
        app
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        App::new()
            .wrap(from_fn(session_middleware))
            .app_data(Data::new(self.pool.clone()))
            .app_data(Data::new(self.config.clone()))
            .app_data(self.revoked.clone())
            .app_data(self.filter.clone())
            .configure(move |cfg| routes::configure(cfg, &config))
    }

    async fn seed_admin(&self) {
        let hashed = hash_password(ADMIN_PASSWORD).unwrap();
        repo::user::insert(&self.pool, ADMIN, &hashed, Role::Admin, None)
            .await
            .expect("seed admin");
        self.filter.insert(ADMIN);
    }

    /// Adds an intern the way the admin form does, account included.
    pub async fn seed_intern(&self, matricule: &str) -> CreatedIntern {
        let digits: String = matricule.chars().filter(|c| c.is_ascii_digit()).collect();
        let fields = InternFields {
            full_name: format!("Stagiaire {matricule}"),
            office: "DCP".to_string(),
            surface_id: format!("034{digits:0>7}"),
            matricule: matricule.to_string(),
        };
        create_intern(&self.pool, &self.filter, &fields)
            .await
            .expect("seed intern")
    }

    pub async fn attendance_rows(&self, intern_id: i64) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE intern_id = ?")
            .bind(intern_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn presence(&self, intern_id: i64, date: &str) -> Option<f64> {
        repo::attendance::get(&self.pool, intern_id, date_of(date))
            .await
            .unwrap()
    }
}

pub fn date_of(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Rate-limited routes key on the client address, so every request carries one.
pub fn get(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri).peer_addr(peer())
}

pub fn post(uri: &str) -> TestRequest {
    TestRequest::post().uri(uri).peer_addr(peer())
}

pub fn post_json(uri: &str, body: &Value) -> TestRequest {
    post(uri).set_json(body)
}

pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<&str> {
    resp.headers()
        .get(actix_web::http::header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Logs in and yields the session cookie; panics when the login fails.
macro_rules! login {
    ($app:expr, $username:expr, $password:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            common::post_json(
                "/login",
                &serde_json::json!({ "username": $username, "password": $password }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK, "login failed");
        common::session_cookie(&resp).expect("login sets the session cookie")
    }};
}
