//! End-to-end handler tests against the in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use roster_server::db::repos::{MemoryUserStore, UserStore};
use roster_server::http::{build_router, AppState, ServerConfig};
use roster_server::models::NewUser;

const BOUNDARY: &str = "roster-test-boundary";

struct TestApp {
    router: Router,
    store: Arc<MemoryUserStore>,
    upload_dir: tempfile::TempDir,
}

fn app() -> TestApp {
    app_with_cors(false)
}

fn app_with_cors(cors_permissive: bool) -> TestApp {
    let store = Arc::new(MemoryUserStore::new());
    let upload_dir = tempfile::tempdir().unwrap();
    let state = AppState::new(store.clone(), upload_dir.path());
    TestApp {
        router: build_router(state, cors_permissive),
        store,
        upload_dir,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn upload_request(field: &str, csv: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"users.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/users/upload")
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

fn staged_files(app: &TestApp) -> usize {
    std::fs::read_dir(app.upload_dir.path()).unwrap().count()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, body) = send(&app.router, empty_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_then_list() {
    let app = app();

    let (status, created) = send(
        &app.router,
        json_request("POST", "/users", json!({"name": "Ana", "email": "ana@x.com", "age": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Ana");
    assert_eq!(created["email"], "ana@x.com");
    assert_eq!(created["age"], 30);
    let id = created["id"].as_i64().unwrap();

    let (status, listed) = send(&app.router, empty_request("GET", "/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([{"id": id, "name": "Ana", "email": "ana@x.com", "age": 30}]));
}

#[tokio::test]
async fn list_is_ordered_by_id() {
    let app = app();
    for (name, email) in [("Cid", "cid@x.com"), ("Ana", "ana@x.com")] {
        app.store.create(NewUser::new(name, email, 20)).await.unwrap();
    }

    let (_, listed) = send(&app.router, empty_request("GET", "/users")).await;
    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn duplicate_create_is_500_and_keeps_one_record() {
    let app = app();
    let body = json!({"name": "Ana", "email": "ana@x.com", "age": 30});
    send(&app.router, json_request("POST", "/users", body.clone())).await;

    let (status, error) = send(&app.router, json_request("POST", "/users", body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"], "internal_error");

    let matching = app
        .store
        .list()
        .await
        .unwrap()
        .into_iter()
        .filter(|u| u.email == "ana@x.com")
        .count();
    assert_eq!(matching, 1);
}

#[tokio::test]
async fn update_replaces_all_fields() {
    let app = app();
    let user = app.store.create(NewUser::new("Ana", "ana@x.com", 30)).await.unwrap();

    let (status, updated) = send(
        &app.router,
        json_request(
            "PUT",
            &format!("/users/{}", user.id),
            json!({"name": "Ana Maria", "email": "anam@x.com", "age": 31}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        updated,
        json!({"id": user.id, "name": "Ana Maria", "email": "anam@x.com", "age": 31})
    );
}

#[tokio::test]
async fn update_missing_is_404_and_creates_nothing() {
    let app = app();
    let (status, body) = send(
        &app.router,
        json_request("PUT", "/users/42", json!({"name": "Ghost", "email": "g@x.com", "age": 1})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_then_delete_again() {
    let app = app();
    let user = app.store.create(NewUser::new("Ana", "ana@x.com", 30)).await.unwrap();
    let other = app.store.create(NewUser::new("Cid", "cid@x.com", 41)).await.unwrap();
    let uri = format!("/users/{}", user.id);

    let (status, body) = send(&app.router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app.router, empty_request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.list().await.unwrap(), vec![other]);
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let app = app();
    let (status, body) = send(&app.router, empty_request("DELETE", "/users/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn upload_reports_attempted_count() {
    let app = app();
    let csv = "name,email,age\nAna,ana@x.com,30\nBob,,x\nCid,cid@x.com,41";

    let (status, body) = send(&app.router, upload_request("file", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Inserted 2 users successfully.");
    assert_eq!(body["attempted"], 2);

    let emails: Vec<String> = app
        .store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.email)
        .collect();
    assert_eq!(emails, vec!["ana@x.com", "cid@x.com"]);
    assert_eq!(staged_files(&app), 0);
}

#[tokio::test]
async fn upload_counts_duplicates_as_attempted() {
    let app = app();
    app.store.create(NewUser::new("Ana", "ana@x.com", 30)).await.unwrap();
    let csv = "name,email,age\nAna,ana@x.com,30\nCid,cid@x.com,41";

    let (status, body) = send(&app.router, upload_request("file", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempted"], 2);
    assert_eq!(app.store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn upload_without_file_field_is_400() {
    let app = app();
    let (status, body) = send(&app.router, upload_request("attachment", "name,email,age")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_upload");
    assert_eq!(staged_files(&app), 0);
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/users")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn default_cors_allows_any_origin() {
    let app = app_with_cors(ServerConfig::default().cors_permissive);
    let response = app
        .router
        .clone()
        .oneshot(preflight("https://frontend.example.com"))
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn local_only_cors_rejects_foreign_origin() {
    let app = app_with_cors(false);
    let response = app
        .router
        .clone()
        .oneshot(preflight("https://frontend.example.com"))
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}
