use crate::api::attendance::{DateGrid, DateGridForm, DateGridRow, MonthGrid, MonthGridForm};
use crate::api::intern::{AccountProvisioning, CreatedIntern, DeleteConfirmation, InternForm};
use crate::api::me::{CheckIn, History, Profile};
use crate::api::report::{Period, Summary};
use crate::auth::handlers::LoginResponse;
use crate::auth::jwt::SESSION_COOKIE;
use crate::export::aggregate::SummaryRow;
use crate::model::{attendance::AttendanceRecord, intern::Intern, role::Role};
use crate::models::{LoginReqDto, RegisterReq};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stagiaires API",
        version = "1.0.0",
        description = r#"
## Intern attendance tracking

Backs the attendance registry of the interns ("stagiaires") and the monthly
payment statement sent to the postal accounts office.

### 🔹 Key Features
- **Interns**
  - Register, edit and delete interns; each new intern gets a login named after its matricule
- **Attendance**
  - Daily grid for every intern, month grid for one intern, self check-in
- **Reports**
  - Monthly totals, PDF and Excel payment statements

### 🔐 Security
Logging in sets an HttpOnly `session` cookie. The session ends after
the configured inactivity window without a request, or on logout.
Admin routes answer `303 See Other` towards the caller's own landing page
when reached with an intern account.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register_form,
        crate::auth::handlers::register,
        crate::auth::handlers::logout,

        crate::api::intern::list_interns,
        crate::api::intern::create,
        crate::api::intern::edit_form,
        crate::api::intern::update,
        crate::api::intern::delete,

        crate::api::attendance::date_grid,
        crate::api::attendance::save_date_grid,
        crate::api::attendance::month_grid,
        crate::api::attendance::save_month_grid,

        crate::api::me::profile,
        crate::api::me::checkin,
        crate::api::me::history,

        crate::api::report::summary,
        crate::api::report::summary_form,
        crate::api::report::export_pdf,
        crate::api::report::export_pdf_form,
        crate::api::report::export_xlsx,
        crate::api::report::export_xlsx_form
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            RegisterReq,
            Role,
            Intern,
            InternForm,
            DeleteConfirmation,
            AccountProvisioning,
            CreatedIntern,
            AttendanceRecord,
            DateGrid,
            DateGridRow,
            DateGridForm,
            MonthGrid,
            MonthGridForm,
            Profile,
            CheckIn,
            History,
            Period,
            Summary,
            SummaryRow
        )
    ),
    modifiers(&SessionCookie),
    security(("session_cookie" = [])),
    tags(
        (name = "Auth", description = "Login, registration and logout"),
        (name = "Interns", description = "Intern management (admin)"),
        (name = "Attendance", description = "Attendance grids (admin)"),
        (name = "Me", description = "Intern self-service"),
        (name = "Reports", description = "Monthly totals and payment statements (admin)"),
    )
)]
pub struct ApiDoc;

struct SessionCookie;

impl Modify for SessionCookie {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
            );
        }
    }
}
