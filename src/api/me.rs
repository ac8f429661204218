use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{attendance::AttendanceRecord, intern::Intern, month::YearMonth},
    repo,
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, ToSchema)]
pub struct Profile {
    pub username: String,
    pub intern: Intern,
    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub today: NaiveDate,
    /// Presence already recorded for today, if any.
    #[schema(nullable = true, example = 1.0)]
    pub today_presence: Option<f64>,
}

/// Outcome of a self check-in. A second check-in the same day is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckIn {
    Recorded,
    AlreadyRecorded,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// `YYYY-MM`, defaults to the current month.
    #[param(value_type = Option<String>, example = "2025-06")]
    pub month: Option<YearMonth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct History {
    #[schema(value_type = String, example = "2025-06")]
    pub month: YearMonth,
    pub records: Vec<AttendanceRecord>,
    #[schema(example = 12.5)]
    pub total: f64,
}

async fn linked_intern(auth: &AuthUser, pool: &SqlitePool) -> Result<Intern, AppError> {
    auth.require_intern()?;
    // The link is cleared when the intern is deleted, but an older session
    // may still carry it.
    repo::intern::get(pool, auth.linked_intern()?)
        .await?
        .ok_or_else(|| AppError::NotFound("Profil stagiaire introuvable.".into()))
}

/// Records today's presence for the caller's intern unless one exists already.
pub async fn check_in(
    pool: &SqlitePool,
    intern_id: i64,
    date: NaiveDate,
) -> Result<CheckIn, AppError> {
    let time = Local::now().time();
    if repo::attendance::insert_check_in(pool, intern_id, date, time).await? {
        Ok(CheckIn::Recorded)
    } else {
        Ok(CheckIn::AlreadyRecorded)
    }
}

/// Own profile
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Linked intern and today's presence", body = Profile),
        (status = 303, description = "Not logged in, or not an intern account"),
        (status = 404, description = "Account has no intern profile")
    ),
    tag = "Me"
)]
pub async fn profile(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let intern = linked_intern(&auth, pool.get_ref()).await?;
    let today = Local::now().date_naive();
    let today_presence = repo::attendance::get(pool.get_ref(), intern.id, today).await?;

    Ok(HttpResponse::Ok().json(Profile {
        username: auth.username,
        intern,
        today,
        today_presence,
    }))
}

/// Mark today as present
#[utoipa::path(
    post,
    path = "/me/checkin",
    responses(
        (status = 200, description = "Checked in, or already recorded today", body = Object, example = json!({
            "status": "already_recorded",
            "message": "Présence déjà enregistrée pour aujourd'hui."
        })),
        (status = 404, description = "Account has no intern profile")
    ),
    tag = "Me"
)]
pub async fn checkin(auth: AuthUser, pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let intern = linked_intern(&auth, pool.get_ref()).await?;
    let today = Local::now().date_naive();

    let outcome = check_in(pool.get_ref(), intern.id, today).await?;
    let message = match outcome {
        CheckIn::Recorded => "Présence enregistrée.",
        CheckIn::AlreadyRecorded => "Présence déjà enregistrée pour aujourd'hui.",
    };
    info!(intern_id = intern.id, date = %today, ?outcome, "Self check-in");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": outcome,
        "message": message,
    })))
}

/// Own records for a month
#[utoipa::path(
    get,
    path = "/me/attendance",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Records ordered by date", body = History),
        (status = 404, description = "Account has no intern profile")
    ),
    tag = "Me"
)]
pub async fn history(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, AppError> {
    let intern = linked_intern(&auth, pool.get_ref()).await?;
    let month = query
        .month
        .unwrap_or_else(|| YearMonth::containing(Local::now().date_naive()));

    let records = repo::attendance::for_intern_month(pool.get_ref(), intern.id, month).await?;
    let total = records.iter().map(|r| r.presence).sum();

    Ok(HttpResponse::Ok().json(History {
        month,
        records,
        total,
    }))
}
