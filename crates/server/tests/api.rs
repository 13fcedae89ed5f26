use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["alice".into(), "password".into()],
    ))
    .await
    .unwrap();

    let media_dir = std::env::temp_dir().join(format!("kakeibo_api_{}", Uuid::new_v4()));
    let engine = engine::Engine::builder()
        .database(db.clone())
        .media_dir(media_dir)
        .build()
        .await
        .unwrap();

    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn basic_auth() -> String {
    let credentials = base64::engine::general_purpose::STANDARD.encode("alice:password");
    format!("Basic {credentials}")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth())
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, basic_auth())
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn requests_without_credentials_are_rejected() {
    let app = app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/expenses")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Missing typed header rejection surfaces as a client error.
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;

    let credentials = base64::engine::general_purpose::STANDARD.encode("alice:nope");
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/expenses")
                .header(header::AUTHORIZATION, format!("Basic {credentials}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expense_create_and_list_roundtrip() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/expenses",
            json!({
                "date": "2025-06-10",
                "item": "昼ご飯",
                "amount": 650,
                "category_id": null,
                "memo": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["amount"], 650);

    let response = app
        .oneshot(get("/expenses?month=2025-06"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["expenses"][0]["item"], "昼ご飯");
}

#[tokio::test]
async fn invalid_amount_is_unprocessable() {
    let app = app().await;

    let response = app
        .oneshot(send_json(
            "POST",
            "/expenses",
            json!({
                "date": "2025-06-10",
                "item": "コーヒー",
                "amount": 0,
                "category_id": null,
                "memo": null
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_expense_is_not_found() {
    let app = app().await;

    let response = app
        .oneshot(get(&format!("/expenses/{}", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn seeded_categories_feed_the_guesser() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json("POST", "/categories/seed", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["created"], 9);

    let response = app
        .oneshot(get("/categories/guess?item=%E9%9B%BB%E6%B0%97%E4%BB%A3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["category"]["name"], "水道光熱");
}

#[tokio::test]
async fn guess_respects_the_chosen_category() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json("POST", "/categories", json!({ "name": "旅行" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = json_body(response).await;
    let category_id = category["id"].as_str().unwrap().to_string();

    // A category picked by the user wins over any keyword match.
    let response = app
        .oneshot(get(&format!(
            "/categories/guess?item=lunch&category={category_id}"
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["category"]["id"], category_id.as_str());
    assert_eq!(body["category"]["name"], "旅行");
}

#[tokio::test]
async fn garbage_month_falls_back_to_the_current_month() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(get("/dashboard?month=garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let current = chrono::Utc::now().format("%Y-%m").to_string();
    assert_eq!(body["month"], current.as_str());

    let response = app
        .oneshot(get("/expenses?month=not-a-month"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_budget_conflicts() {
    let app = app().await;

    let payload = json!({ "month": "2025-06", "category_id": null, "amount": 100000 });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/budgets", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(send_json("POST", "/budgets", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn receipt_commit_enforces_the_declared_total() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            "/receipts",
            json!({
                "date": "2025-06-10",
                "total": 736,
                "image_base64": null,
                "lines": [
                    { "item": "牛乳", "amount": 238, "raw_text": null },
                    { "item": "小計", "amount": 736, "raw_text": null },
                    { "item": "お弁当", "amount": 498, "raw_text": null }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = json_body(response).await;
    let receipt_id = receipt["id"].as_str().unwrap().to_string();
    // The subtotal row is filtered out during staging.
    assert_eq!(receipt["lines"].as_array().unwrap().len(), 2);
    assert_eq!(receipt["lines_total"], 736);

    // Break the total on review, then the commit is rejected.
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/receipts/{receipt_id}/lines"),
            json!({
                "total": null,
                "lines": [
                    { "item": "牛乳", "amount": "238", "category_id": null }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/receipts/{receipt_id}/commit"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Restore matching lines and commit for real.
    let response = app
        .clone()
        .oneshot(send_json(
            "PUT",
            &format!("/receipts/{receipt_id}/lines"),
            json!({
                "total": null,
                "lines": [
                    { "item": "牛乳", "amount": "238", "category_id": null },
                    { "item": "お弁当", "amount": "¥498", "category_id": null }
                ]
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/receipts/{receipt_id}/commit"),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["created"], 2);

    let response = app
        .oneshot(get("/expenses?month=2025-06"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn csv_export_serves_an_attachment() {
    let app = app().await;

    app.clone()
        .oneshot(send_json(
            "POST",
            "/expenses",
            json!({
                "date": "2025-06-10",
                "item": "牛乳",
                "amount": 238,
                "category_id": null,
                "memo": null
            }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/expenses/export?month=2025-06"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("date,item,amount,category,memo"));
    assert!(text.contains("牛乳"));
}

#[tokio::test]
async fn dashboard_reports_the_requested_month() {
    let app = app().await;

    app.clone()
        .oneshot(send_json(
            "POST",
            "/expenses",
            json!({
                "date": "2025-06-10",
                "item": "昼ご飯",
                "amount": 650,
                "category_id": null,
                "memo": null
            }),
        ))
        .await
        .unwrap();

    let response = app.oneshot(get("/dashboard?month=2025-06")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["month"], "2025-06");
    assert_eq!(body["expense_total"], 650);
    assert_eq!(body["last_six_months"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn analytics_returns_suggestions() {
    let app = app().await;

    let response = app.oneshot(get("/analytics?month=2025-06")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 0);
    assert!(!body["suggestions"].as_array().unwrap().is_empty());
}
