use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::{
        attendance::{AttendanceRecord, Presence},
        intern::Intern,
        month::YearMonth,
    },
    repo,
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tracing::info;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Defaults to today.
    #[param(value_type = Option<String>, example = "2025-06-02")]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DateGridRow {
    pub intern: Intern,
    /// Absent when nothing is recorded yet.
    #[schema(example = 1.0, nullable = true)]
    pub presence: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DateGrid {
    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub rows: Vec<DateGridRow>,
}

/// Presence values keyed by intern id.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DateGridForm {
    #[schema(example = "2025-06-02", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = json!({"1": 1.0, "2": 0.5, "3": 0.0}))]
    pub presences: HashMap<i64, f64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct MonthGridQuery {
    pub intern_id: Option<i64>,
    /// `YYYY-MM`, defaults to the current month.
    #[param(value_type = Option<String>, example = "2025-03")]
    pub month: Option<YearMonth>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthGrid {
    #[schema(value_type = String, example = "2025-03")]
    pub month: YearMonth,
    pub interns: Vec<Intern>,
    pub selected: Option<i64>,
    /// Monday to Friday of the month; the only days the grid writes.
    #[schema(value_type = Vec<String>)]
    pub weekdays: Vec<NaiveDate>,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MonthGridForm {
    pub intern_id: i64,
    #[schema(value_type = String, example = "2025-03")]
    pub month: YearMonth,
    /// Checked days. Every other weekday of the month is written as absent.
    #[serde(default)]
    #[schema(value_type = Vec<String>, example = json!(["2025-03-03", "2025-03-04"]))]
    pub present: Vec<NaiveDate>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Presence of every intern on one date
#[utoipa::path(
    get,
    path = "/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "Interns by matricule with their presence", body = DateGrid),
        (status = 303, description = "Not logged in, or not an admin")
    ),
    tag = "Attendance"
)]
pub async fn date_grid(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let date = query.date.unwrap_or_else(today);

    let (interns, mut presences) = futures::try_join!(
        repo::intern::list(pool.get_ref()),
        repo::attendance::for_date(pool.get_ref(), date)
    )?;

    let rows = interns
        .into_iter()
        .map(|intern| DateGridRow {
            presence: presences.remove(&intern.id),
            intern,
        })
        .collect();

    Ok(HttpResponse::Ok().json(DateGrid { date, rows }))
}

/// Record presences for one date
///
/// Writes all entries or none. Ids that match no intern are skipped.
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = DateGridForm,
    responses(
        (status = 200, description = "Presences saved", body = Object, example = json!({
            "message": "Présences enregistrées.",
            "date": "2025-06-02",
            "written": 3
        })),
        (status = 400, description = "A value is not 0, 0.5 or 1; nothing was written")
    ),
    tag = "Attendance"
)]
pub async fn save_date_grid(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    form: web::Json<DateGridForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let form = form.into_inner();

    let mut entries = Vec::with_capacity(form.presences.len());
    for (intern_id, value) in form.presences {
        let presence = Presence::try_from(value).map_err(AppError::Validation)?;
        entries.push((intern_id, presence));
    }

    let known: HashSet<i64> = repo::intern::list(pool.get_ref())
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();
    entries.retain(|(id, _)| known.contains(id));

    let mut tx = pool.begin().await?;
    for (intern_id, presence) in &entries {
        repo::attendance::upsert(&mut *tx, *intern_id, form.date, *presence).await?;
    }
    tx.commit().await?;

    info!(date = %form.date, written = entries.len(), "Date grid saved");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Présences enregistrées.",
        "date": form.date,
        "written": entries.len(),
    })))
}

/// One intern's weekdays for a month
#[utoipa::path(
    get,
    path = "/attendance/admin",
    params(MonthGridQuery),
    responses(
        (status = 200, description = "Interns by name, the month's weekdays and the selected intern's records", body = MonthGrid),
        (status = 404, description = "No such intern")
    ),
    tag = "Attendance"
)]
pub async fn month_grid(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<MonthGridQuery>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let month = query.month.unwrap_or_else(|| YearMonth::containing(today()));
    let interns = repo::intern::list_by_name(pool.get_ref()).await?;

    let records = match query.intern_id {
        Some(id) => {
            if !interns.iter().any(|i| i.id == id) {
                return Err(AppError::NotFound("Stagiaire introuvable.".into()));
            }
            repo::attendance::for_intern_month(pool.get_ref(), id, month).await?
        }
        None => Vec::new(),
    };

    Ok(HttpResponse::Ok().json(MonthGrid {
        month,
        interns,
        selected: query.intern_id,
        weekdays: month.weekdays(),
        records,
    }))
}

/// Overwrite one intern's weekdays for a month
///
/// Listed weekdays become 1, all other weekdays 0. Weekend dates and dates
/// outside the month are ignored.
#[utoipa::path(
    post,
    path = "/attendance/admin",
    request_body = MonthGridForm,
    responses(
        (status = 200, description = "Month saved", body = Object, example = json!({
            "message": "Présences du mois enregistrées.",
            "present": 2,
            "absent": 19
        })),
        (status = 404, description = "No such intern")
    ),
    tag = "Attendance"
)]
pub async fn save_month_grid(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    form: web::Json<MonthGridForm>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let form = form.into_inner();

    if repo::intern::get(pool.get_ref(), form.intern_id).await?.is_none() {
        return Err(AppError::NotFound("Stagiaire introuvable.".into()));
    }

    let checked: HashSet<NaiveDate> = form.present.into_iter().collect();
    let weekdays = form.month.weekdays();
    let mut present = 0usize;

    let mut tx = pool.begin().await?;
    for day in &weekdays {
        let presence = Presence::from_checkbox(checked.contains(day));
        if presence == Presence::FullDay {
            present += 1;
        }
        repo::attendance::upsert(&mut *tx, form.intern_id, *day, presence).await?;
    }
    tx.commit().await?;

    info!(intern_id = form.intern_id, month = %form.month, present, "Month grid saved");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Présences du mois enregistrées.",
        "present": present,
        "absent": weekdays.len() - present,
    })))
}
