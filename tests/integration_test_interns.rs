#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use common::{ADMIN, ADMIN_PASSWORD, TestApp, get, post_json};
use serde_json::{Value, json};
use stagiaires::{
    api::intern::{AccountProvisioning, create_intern},
    auth::password::hash_password,
    model::{attendance::Presence, role::Role},
    repo::{self, intern::InternFields},
};

fn form(matricule: &str, surface_id: &str) -> Value {
    json!({
        "full_name": format!("Stagiaire {matricule}"),
        "office": "DCP",
        "surface_id": surface_id,
        "matricule": matricule,
    })
}

#[actix_web::test]
async fn created_intern_gets_an_account() {
    let ctx = TestApp::new().await;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        post_json("/interns", &form("M010", "0340000010")).cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["account"]["status"], "created");
    assert_eq!(body["account"]["username"], "M010");

    let resp = test::call_service(
        &app,
        post_json("/interns", &form("M010", "0349999999")).cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "PAOSITRA MONEY ou Matricule déjà utilisé.");

    let resp = test::call_service(
        &app,
        post_json("/interns", &json!({"full_name": "X", "office": " ", "surface_id": "1", "matricule": "M011"}))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let _ = login!(app, "M010", "M010");
}

#[actix_web::test]
async fn provisioning_failure_keeps_the_intern() {
    let ctx = TestApp::new().await;
    let hashed = hash_password("other").unwrap();
    repo::user::insert(&ctx.pool, "M020", &hashed, Role::Admin, None).await.unwrap();

    let fields = InternFields {
        full_name: "RABE Paul".into(),
        office: "DCP".into(),
        surface_id: "0340000020".into(),
        matricule: "M020".into(),
    };
    let created = create_intern(&ctx.pool, &ctx.filter, &fields).await.unwrap();

    assert!(matches!(created.account, AccountProvisioning::Failed { .. }));
    assert!(repo::intern::get(&ctx.pool, created.intern.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn list_and_edit_interns() {
    let ctx = TestApp::new().await;
    ctx.seed_intern("M002").await;
    let first = ctx.seed_intern("M001").await.intern;
    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(&app, get("/").cookie(cookie.clone()).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    let matricules: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["matricule"].as_str().unwrap())
        .collect();
    assert_eq!(matricules, vec!["M001", "M002"]);

    let uri = format!("/interns/{}/edit", first.id);
    let resp = test::call_service(
        &app,
        post_json(&uri, &json!({"full_name": "RAKOTO Jean", "office": "DRH", "surface_id": "0341111111", "matricule": "M001"}))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, get(&uri).cookie(cookie.clone()).to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["full_name"], "RAKOTO Jean");
    assert_eq!(body["office"], "DRH");

    // Taking the other intern's matricule collides.
    let resp = test::call_service(
        &app,
        post_json(&uri, &form("M002", "0341111111")).cookie(cookie.clone()).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = test::call_service(&app, get("/interns/999/edit").cookie(cookie).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_cascades_attendance_and_keeps_the_login() {
    let ctx = TestApp::new().await;
    for m in ["M001", "M002", "M003", "M004"] {
        ctx.seed_intern(m).await;
    }
    let fifth = ctx.seed_intern("M005").await.intern;
    assert_eq!(fifth.id, 5);

    repo::attendance::upsert(&ctx.pool, 5, common::date_of("2025-06-02"), Presence::FullDay)
        .await
        .unwrap();

    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        post_json("/interns/5/delete", &json!({"matricule": "M004"}))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(repo::intern::get(&ctx.pool, 5).await.unwrap().is_some());

    let resp = test::call_service(
        &app,
        post_json("/interns/5/delete", &json!({"matricule": "M005"}))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(repo::intern::get(&ctx.pool, 5).await.unwrap().is_none());
    assert_eq!(ctx.attendance_rows(5).await, 0);

    // The account outlives its intern, unlinked.
    let orphan = login!(app, "M005", "M005");
    let resp = test::call_service(&app, get("/me").cookie(orphan).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(
        &app,
        post_json("/interns/5/delete", &json!({"matricule": "M005"}))
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn re_adding_a_deleted_matricule_relinks_its_login() {
    let ctx = TestApp::new().await;
    let first = ctx.seed_intern("M001").await.intern;

    let app = test::init_service(ctx.app()).await;
    let cookie = login!(app, ADMIN, ADMIN_PASSWORD);

    let resp = test::call_service(
        &app,
        post_json(&format!("/interns/{}/delete", first.id), &json!({"matricule": "M001"}))
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(
        &app,
        post_json("/interns", &form("M001", "0340000001")).cookie(cookie).to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["account"]["status"], "relinked");
    assert_eq!(body["account"]["username"], "M001");
    let new_id = body["intern"]["id"].as_i64().unwrap();

    let session = login!(app, "M001", "M001");
    let resp = test::call_service(&app, get("/me").cookie(session).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["intern"]["id"], new_id);
}

#[actix_web::test]
async fn admin_account_with_the_matricule_is_never_relinked() {
    let ctx = TestApp::new().await;
    let hashed = hash_password("other").unwrap();
    repo::user::insert(&ctx.pool, "M030", &hashed, Role::Admin, None).await.unwrap();

    let fields = InternFields {
        full_name: "RASOA Marie".into(),
        office: "DCP".into(),
        surface_id: "0340000030".into(),
        matricule: "M030".into(),
    };
    let created = create_intern(&ctx.pool, &ctx.filter, &fields).await.unwrap();
    assert!(matches!(created.account, AccountProvisioning::Failed { .. }));

    let account = repo::user::find_by_username(&ctx.pool, "M030").await.unwrap().unwrap();
    assert_eq!(account.intern_id, None);
}
