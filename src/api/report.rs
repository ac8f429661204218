use crate::{
    auth::auth::AuthUser,
    config::Config,
    error::AppError,
    export::{
        aggregate::{SummaryRow, aggregate},
        pdf::render_pdf,
        statement::{Statement, build_statement},
        xlsx::render_xlsx,
    },
    model::month::YearMonth,
};
use actix_web::{
    HttpResponse,
    http::header::{self, ContentDisposition, DispositionParam, DispositionType},
    web,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

const PDF_MIME: &str = "application/pdf";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MonthField {
    Number(u32),
    Text(String),
}

/// Either `month=YYYY-MM`, or `month` (1-12) with `year`. Defaults to the current month.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct Period {
    #[param(value_type = Option<String>, example = "2025-03")]
    #[schema(value_type = Option<String>, example = "2025-03")]
    month: Option<MonthField>,
    #[param(example = 2025)]
    #[schema(example = 2025)]
    year: Option<i32>,
}

impl Period {
    pub fn resolve(&self) -> Result<YearMonth, AppError> {
        let invalid = || AppError::Validation("Mois ou année invalide.".into());

        match (&self.month, self.year) {
            (None, None) => Ok(YearMonth::containing(Local::now().date_naive())),
            (None, Some(_)) => Err(invalid()),
            (Some(MonthField::Number(m)), Some(y)) => YearMonth::new(y, *m).ok_or_else(invalid),
            (Some(MonthField::Text(m)), Some(y)) => {
                let m: u32 = m.trim().parse().map_err(|_| invalid())?;
                YearMonth::new(y, m).ok_or_else(invalid)
            }
            (Some(MonthField::Text(m)), None) => m.trim().parse().map_err(|_| invalid()),
            (Some(MonthField::Number(_)), None) => Err(invalid()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Summary {
    #[schema(value_type = String, example = "2025-03")]
    pub month: YearMonth,
    pub rows: Vec<SummaryRow>,
}

async fn summary_for(pool: &SqlitePool, period: &Period) -> Result<HttpResponse, AppError> {
    let month = period.resolve()?;
    let rows = aggregate(pool, month).await?.summary();
    Ok(HttpResponse::Ok().json(Summary { month, rows }))
}

/// Monthly totals per intern
#[utoipa::path(
    get,
    path = "/reports/summary",
    params(Period),
    responses(
        (status = 200, description = "Totals, zero-filled, by matricule", body = Summary),
        (status = 400, description = "Invalid month or year")
    ),
    tag = "Reports"
)]
pub async fn summary(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    summary_for(pool.get_ref(), &query).await
}

/// Monthly totals per intern (form variant)
#[utoipa::path(
    post,
    path = "/reports/summary",
    request_body = Period,
    responses(
        (status = 200, description = "Totals, zero-filled, by matricule", body = Summary),
        (status = 400, description = "Invalid month or year")
    ),
    tag = "Reports"
)]
pub async fn summary_form(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    form: web::Json<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    summary_for(pool.get_ref(), &form).await
}

#[derive(Debug, Clone, Copy)]
enum Format {
    Pdf,
    Xlsx,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Xlsx => "xlsx",
        }
    }

    fn mime(self) -> &'static str {
        match self {
            Format::Pdf => PDF_MIME,
            Format::Xlsx => XLSX_MIME,
        }
    }

    fn render(self, statement: &Statement) -> Result<Vec<u8>, AppError> {
        match self {
            Format::Pdf => render_pdf(statement),
            Format::Xlsx => render_xlsx(statement),
        }
    }
}

async fn export(
    pool: &SqlitePool,
    config: &Config,
    period: &Period,
    format: Format,
) -> Result<HttpResponse, AppError> {
    let month = period.resolve()?;
    let monthly = aggregate(pool, month).await?;
    let statement = build_statement(&monthly, &config.workplace);
    let file_name = statement.file_name(format.extension());

    let bytes = web::block(move || format.render(&statement))
        .await
        .map_err(|e| AppError::ExportFailure(e.to_string()))??;

    info!(month = %month, file = %file_name, size = bytes.len(), "Statement exported");

    Ok(HttpResponse::Ok()
        .content_type(format.mime())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file_name)],
        })
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .body(bytes))
}

/// Payment statement as PDF
#[utoipa::path(
    get,
    path = "/reports/export.pdf",
    params(Period),
    responses(
        (status = 200, description = "Etat_presences_YYYY_MM.pdf", content_type = "application/pdf"),
        (status = 400, description = "Invalid month or year"),
        (status = 500, description = "Document generation failed")
    ),
    tag = "Reports"
)]
pub async fn export_pdf(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    query: web::Query<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    export(pool.get_ref(), &config, &query, Format::Pdf).await
}

/// Payment statement as PDF (form variant)
#[utoipa::path(
    post,
    path = "/reports/export.pdf",
    request_body = Period,
    responses(
        (status = 200, description = "Etat_presences_YYYY_MM.pdf", content_type = "application/pdf"),
        (status = 400, description = "Invalid month or year")
    ),
    tag = "Reports"
)]
pub async fn export_pdf_form(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    form: web::Json<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    export(pool.get_ref(), &config, &form, Format::Pdf).await
}

/// Payment statement as an Excel workbook
#[utoipa::path(
    get,
    path = "/reports/export.xlsx",
    params(Period),
    responses(
        (status = 200, description = "Etat_presences_YYYY_MM.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid month or year"),
        (status = 500, description = "Document generation failed")
    ),
    tag = "Reports"
)]
pub async fn export_xlsx(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    query: web::Query<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    export(pool.get_ref(), &config, &query, Format::Xlsx).await
}

/// Payment statement as an Excel workbook (form variant)
#[utoipa::path(
    post,
    path = "/reports/export.xlsx",
    request_body = Period,
    responses(
        (status = 200, description = "Etat_presences_YYYY_MM.xlsx", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 400, description = "Invalid month or year")
    ),
    tag = "Reports"
)]
pub async fn export_xlsx_form(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    form: web::Json<Period>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    export(pool.get_ref(), &config, &form, Format::Xlsx).await
}
