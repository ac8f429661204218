#[macro_use]
mod common;

use actix_web::{
    http::{StatusCode, header},
    test,
};
use common::{ADMIN, ADMIN_PASSWORD, TestApp, date_of, get, post_json};
use serde_json::{Value, json};
use stagiaires::{
    export::aggregate::aggregate,
    model::{attendance::Presence, month::YearMonth},
    repo,
};

async fn seed_march(ctx: &TestApp) -> (i64, i64) {
    let worked = ctx.seed_intern("M001").await.intern.id;
    let idle = ctx.seed_intern("M002").await.intern.id;
    for (day, presence) in [
        ("2025-03-03", Presence::FullDay),
        ("2025-03-04", Presence::HalfDay),
        ("2025-03-31", Presence::FullDay),
        // outside the month
        ("2025-04-01", Presence::FullDay),
    ] {
        repo::attendance::upsert(&ctx.pool, worked, date_of(day), presence).await.unwrap();
    }
    (worked, idle)
}

#[actix_web::test]
async fn aggregate_is_dense_and_bounded_by_the_month() {
    let ctx = TestApp::new().await;
    let (worked, idle) = seed_march(&ctx).await;

    let month: YearMonth = "2025-03".parse().unwrap();
    let monthly = aggregate(&ctx.pool, month).await.unwrap();
    assert_eq!(monthly.interns.len(), 2);
    for row in &monthly.interns {
        assert_eq!(row.days.len(), 31);
        assert!(row.days.iter().all(|v| *v >= 0.0));
    }

    let worked_row = monthly.interns.iter().find(|r| r.intern.id == worked).unwrap();
    assert_eq!(worked_row.total, 2.5);
    assert_eq!(worked_row.day(31), 1.0);

    let idle_row = monthly.interns.iter().find(|r| r.intern.id == idle).unwrap();
    assert_eq!(idle_row.total, 0.0);
}

#[actix_web::test]
async fn summary_accepts_query_and_form() {
    let ctx = TestApp::new().await;
    seed_march(&ctx).await;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        get("/reports/summary?month=2025-03").cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let query_body: Value = test::read_body_json(resp).await;
    assert_eq!(query_body["month"], "2025-03");
    assert_eq!(query_body["rows"][0]["total"], 2.5);
    assert_eq!(query_body["rows"][1]["total"], 0.0);

    let resp = test::call_service(
        &app,
        post_json("/reports/summary", &json!({"month": 3, "year": 2025}))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let form_body: Value = test::read_body_json(resp).await;
    assert_eq!(form_body, query_body);

    let resp = test::call_service(
        &app,
        get("/reports/summary?month=13&year=2025").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn pdf_export_is_an_attachment() {
    let ctx = TestApp::new().await;
    seed_march(&ctx).await;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        get("/reports/export.pdf?month=3&year=2025").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains("Etat_presences_2025_03.pdf"));

    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"%PDF"));
}

#[actix_web::test]
async fn xlsx_export_is_a_workbook() {
    let ctx = TestApp::new().await;
    seed_march(&ctx).await;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        post_json("/reports/export.xlsx", &json!({"month": "2025-03"}))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(disposition.contains("Etat_presences_2025_03.xlsx"));

    let bytes = test::read_body(resp).await;
    assert!(bytes.starts_with(b"PK"));
}

#[actix_web::test]
async fn exports_are_admin_only() {
    let ctx = TestApp::new().await;
    seed_march(&ctx).await;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, "M001", "M001");

    let resp = test::call_service(
        &app,
        get("/reports/export.pdf?month=2025-03").cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(common::location(&resp), Some("/me"));
}
