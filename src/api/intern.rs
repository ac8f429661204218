use crate::{
    auth::{auth::AuthUser, password::hash_password},
    error::{AppError, is_unique_violation},
    model::{intern::Intern, role::Role},
    repo::{self, intern::InternFields},
    utils::username_filter::UsernameFilter,
};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::{info, warn};
use utoipa::ToSchema;

const DUPLICATE_KEY: &str = "PAOSITRA MONEY ou Matricule déjà utilisé.";

/// Intern form. Every field is required.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InternForm {
    #[schema(example = "RAKOTO Jean")]
    pub full_name: String,
    #[schema(example = "DCP")]
    pub office: String,
    #[schema(example = "0340000001")]
    pub surface_id: String,
    #[schema(example = "M001")]
    pub matricule: String,
}

impl InternForm {
    fn validate(&self) -> Result<InternFields, AppError> {
        let fields = InternFields {
            full_name: self.full_name.trim().to_string(),
            office: self.office.trim().to_string(),
            surface_id: self.surface_id.trim().to_string(),
            matricule: self.matricule.trim().to_string(),
        };
        if fields.full_name.is_empty()
            || fields.office.is_empty()
            || fields.surface_id.is_empty()
            || fields.matricule.is_empty()
        {
            return Err(AppError::Validation("Tous les champs sont requis.".into()));
        }
        Ok(fields)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteConfirmation {
    /// Must repeat the intern's matricule.
    #[schema(example = "M001")]
    pub matricule: String,
}

/// What happened to the login account created alongside an intern.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountProvisioning {
    Created { username: String },
    /// An account left behind by a deleted intern with the same matricule was
    /// linked to the new one. Its password is unchanged.
    Relinked { username: String },
    Failed { reason: String },
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedIntern {
    pub intern: Intern,
    pub account: AccountProvisioning,
}

/// Inserts the intern, then gives it a `user` account named after its matricule
/// with the matricule as initial password. The intern is kept even when the
/// account cannot be created.
pub async fn create_intern(
    pool: &SqlitePool,
    filter: &UsernameFilter,
    fields: &InternFields,
) -> Result<CreatedIntern, AppError> {
    let intern = match repo::intern::insert(pool, fields).await {
        Ok(intern) => intern,
        Err(e) if is_unique_violation(&e) => {
            return Err(AppError::DuplicateKey(DUPLICATE_KEY.into()));
        }
        Err(e) => return Err(e.into()),
    };
    info!(intern_id = intern.id, matricule = %intern.matricule, "Intern created");

    let account = provision_account(pool, &intern).await;
    match &account {
        AccountProvisioning::Created { username } => filter.insert(username),
        AccountProvisioning::Relinked { username } => {
            info!(intern_id = intern.id, username = %username, "Orphaned account relinked")
        }
        AccountProvisioning::Failed { reason } => {
            warn!(intern_id = intern.id, reason = %reason, "Account provisioning failed")
        }
    }

    Ok(CreatedIntern { intern, account })
}

async fn provision_account(pool: &SqlitePool, intern: &Intern) -> AccountProvisioning {
    let hashed = match hash_password(&intern.matricule) {
        Ok(h) => h,
        Err(e) => {
            return AccountProvisioning::Failed {
                reason: e.to_string(),
            };
        }
    };

    match repo::user::insert(pool, &intern.matricule, &hashed, Role::User, Some(intern.id)).await {
        Ok(_) => AccountProvisioning::Created {
            username: intern.matricule.clone(),
        },
        Err(e) if is_unique_violation(&e) => {
            match repo::user::relink_orphan(pool, &intern.matricule, intern.id).await {
                Ok(true) => AccountProvisioning::Relinked {
                    username: intern.matricule.clone(),
                },
                Ok(false) => AccountProvisioning::Failed {
                    reason: format!("le nom d'utilisateur {} existe déjà", intern.matricule),
                },
                Err(e) => AccountProvisioning::Failed {
                    reason: e.to_string(),
                },
            }
        }
        Err(e) => AccountProvisioning::Failed {
            reason: e.to_string(),
        },
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Stagiaire introuvable.".into())
}

/// List interns
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Interns ordered by matricule", body = [Intern]),
        (status = 303, description = "Not logged in, or not an admin")
    ),
    tag = "Interns"
)]
pub async fn list_interns(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let interns = repo::intern::list(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(interns))
}

/// Add an intern and its login account
#[utoipa::path(
    post,
    path = "/interns",
    request_body = InternForm,
    responses(
        (status = 201, description = "Intern created", body = CreatedIntern),
        (status = 400, description = "Missing field"),
        (status = 409, description = "Matricule or PAOSITRA MONEY already used", body = Object, example = json!({
            "error": "PAOSITRA MONEY ou Matricule déjà utilisé."
        }))
    ),
    tag = "Interns"
)]
pub async fn create(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    filter: web::Data<UsernameFilter>,
    form: web::Json<InternForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let fields = form.validate()?;
    let created = create_intern(pool.get_ref(), filter.get_ref(), &fields).await?;

    let message = match &created.account {
        AccountProvisioning::Created { .. } => "Stagiaire ajouté.".to_string(),
        AccountProvisioning::Relinked { username } => {
            format!("Stagiaire ajouté, rattaché au compte existant {username}.")
        }
        AccountProvisioning::Failed { reason } => {
            format!("Stagiaire ajouté, mais le compte n'a pas pu être créé : {reason}")
        }
    };
    Ok(HttpResponse::Created().json(json!({
        "message": message,
        "intern": created.intern,
        "account": created.account,
    })))
}

/// Load an intern for editing
#[utoipa::path(
    get,
    path = "/interns/{id}/edit",
    params(("id" = i64, Path, description = "Intern id")),
    responses(
        (status = 200, description = "Intern", body = Intern),
        (status = 404, description = "No such intern")
    ),
    tag = "Interns"
)]
pub async fn edit_form(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let intern = repo::intern::get(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(intern))
}

/// Overwrite an intern
#[utoipa::path(
    post,
    path = "/interns/{id}/edit",
    params(("id" = i64, Path, description = "Intern id")),
    request_body = InternForm,
    responses(
        (status = 200, description = "Intern updated", body = Object, example = json!({
            "message": "Stagiaire mis à jour."
        })),
        (status = 404, description = "No such intern"),
        (status = 409, description = "Matricule or PAOSITRA MONEY already used")
    ),
    tag = "Interns"
)]
pub async fn update(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    form: web::Json<InternForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();
    let fields = form.validate()?;

    match repo::intern::update(pool.get_ref(), id, &fields).await {
        Ok(0) => Err(not_found()),
        Ok(_) => {
            info!(intern_id = id, "Intern updated");
            Ok(HttpResponse::Ok().json(json!({ "message": "Stagiaire mis à jour." })))
        }
        Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateKey(DUPLICATE_KEY.into())),
        Err(e) => Err(e.into()),
    }
}

/// Delete an intern and its attendance
#[utoipa::path(
    post,
    path = "/interns/{id}/delete",
    params(("id" = i64, Path, description = "Intern id")),
    request_body = DeleteConfirmation,
    responses(
        (status = 200, description = "Intern deleted", body = Object, example = json!({
            "message": "Stagiaire supprimé."
        })),
        (status = 400, description = "Confirmation does not match the matricule"),
        (status = 404, description = "No such intern")
    ),
    tag = "Interns"
)]
pub async fn delete(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    confirmation: web::Json<DeleteConfirmation>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let id = path.into_inner();
    let intern = repo::intern::get(pool.get_ref(), id)
        .await?
        .ok_or_else(not_found)?;

    if confirmation.matricule.trim() != intern.matricule {
        return Err(AppError::Validation(
            "La confirmation ne correspond pas au matricule.".into(),
        ));
    }

    repo::intern::delete(pool.get_ref(), id).await?;
    info!(intern_id = id, matricule = %intern.matricule, "Intern deleted");
    Ok(HttpResponse::Ok().json(json!({ "message": "Stagiaire supprimé." })))
}
