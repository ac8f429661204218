use crate::{
    auth::{
        jwt::{SESSION_COOKIE, encode_session, new_session_claims, verify_token},
        password::{hash_password, verify_password},
        session::{RevokedSessions, removal_cookie, session_cookie},
    },
    config::Config,
    error::{AppError, is_unique_violation},
    model::role::Role,
    models::{LoginReqDto, RegisterReq},
    repo,
    utils::username_filter::UsernameFilter,
};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Connexion réussie.")]
    pub message: String,
    pub role: Role,
    /// Landing page for the role.
    #[schema(example = "/me")]
    pub redirect: String,
}

/// Log in and receive the session cookie
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Session established", body = LoginResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Nom d'utilisateur ou mot de passe incorrect."
        }))
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let username = user.username.trim();
    if username.is_empty() || user.password.is_empty() {
        info!("Validation failed: empty username or password");
        return Err(AppError::Validation(
            "Nom d'utilisateur et mot de passe requis.".into(),
        ));
    }

    let Some(db_user) = repo::user::find_by_username(pool.get_ref(), username).await? else {
        info!("Invalid credentials: user not found");
        return Err(AppError::AuthFailure);
    };
    debug!(user_id = db_user.id, "User found");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::AuthFailure);
    }

    let role = db_user.role();
    let claims = new_session_claims(
        db_user.id,
        db_user.username.clone(),
        role,
        db_user.intern_id,
        config.session_ttl,
    );
    let token = encode_session(&claims, &config.session_secret)
        .map_err(|e| AppError::Internal(format!("session signing failed: {e}")))?;

    info!(jti = %claims.jti, role = %role, "Login successful");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(token, &config))
        .json(LoginResponse {
            message: "Connexion réussie.".into(),
            role,
            redirect: role.landing_page().into(),
        }))
}

/// Roles selectable on the registration form
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 200, description = "Selectable roles", body = Object, example = json!({
            "roles": ["admin", "user"]
        }))
    ),
    tag = "Auth"
)]
pub async fn register_form() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "roles": [Role::Admin, Role::User] }))
}

/// Create an account
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 201, description = "Account created", body = Object, example = json!({
            "message": "Compte créé, vous pouvez vous connecter.",
            "redirect": "/login"
        })),
        (status = 400, description = "Missing field, password mismatch or unknown matricule"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_register",
    skip(pool, filter, req),
    fields(username = %req.username, role = %req.role)
)]
pub async fn register(
    req: web::Json<RegisterReq>,
    pool: web::Data<SqlitePool>,
    filter: web::Data<UsernameFilter>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    let username = req.username.trim();

    if username.is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Nom d'utilisateur et mot de passe requis.".into(),
        ));
    }
    if req.password != req.confirm {
        return Err(AppError::PasswordMismatch);
    }

    let matricule = req
        .matricule
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty());
    if req.role == Role::User && matricule.is_none() {
        return Err(AppError::MissingLinkedIdentity);
    }

    let intern_id = match matricule {
        Some(m) => match repo::intern::find_by_matricule(pool.get_ref(), m).await? {
            Some(intern) => Some(intern.id),
            None => {
                return Err(AppError::Validation(format!(
                    "Aucun stagiaire avec le matricule {m}."
                )));
            }
        },
        None => None,
    };

    // Filter miss: surely free, skip the lookup.
    if filter.might_exist(username) && repo::user::username_exists(pool.get_ref(), username).await? {
        return Err(AppError::DuplicateUsername);
    }

    let hashed = hash_password(&req.password)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;

    match repo::user::insert(pool.get_ref(), username, &hashed, req.role, intern_id).await {
        Ok(user_id) => {
            filter.insert(username);
            info!(user_id, "Account registered");
            Ok(HttpResponse::Created().json(json!({
                "message": "Compte créé, vous pouvez vous connecter.",
                "redirect": "/login"
            })))
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateUsername),
        Err(e) => Err(e.into()),
    }
}

/// End the session
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Session cleared", body = Object, example = json!({
            "message": "Vous êtes déconnecté.",
            "redirect": "/login"
        }))
    ),
    tag = "Auth"
)]
pub async fn logout(
    req: HttpRequest,
    config: web::Data<Config>,
    revoked: web::Data<RevokedSessions>,
) -> HttpResponse {
    // Expired or forged cookies have nothing left to revoke.
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        match verify_token(cookie.value(), &config.session_secret) {
            Ok(claims) => {
                revoked.revoke(&claims.jti).await;
                info!(jti = %claims.jti, username = %claims.sub, "Session ended");
            }
            Err(e) => warn!(error = %e, "Logout with an unusable session cookie"),
        }
    }

    HttpResponse::Ok().cookie(removal_cookie()).json(json!({
        "message": "Vous êtes déconnecté.",
        "redirect": "/login"
    }))
}
