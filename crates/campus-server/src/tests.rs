use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use campus_common::Collection;
use campus_store::{DocumentStore, Filter};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::startup::{AppState, build_router};

fn store() -> DocumentStore {
    DocumentStore::in_memory("campus").unwrap()
}

fn app(store: &DocumentStore) -> Router {
    build_router(AppState::new(Some(store.clone())))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

fn items(body: &Value) -> &Vec<Value> {
    body["items"].as_array().unwrap()
}

#[tokio::test]
async fn root_reports_liveness() {
    let (status, body) = get(app(&store()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "University API is running" }));
}

#[tokio::test]
async fn valid_inquiry_is_stored_and_acknowledged() {
    let store = store();
    let (status, body) = post(
        app(&store),
        "/api/inquiries",
        json!({
            "full_name": "Siti Rahma",
            "email": "siti@example.com",
            "interest_program": "Computer Science (BSc)",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("received"));
    let id = body["id"].as_str().unwrap();
    assert!(!id.is_empty());

    let stored = store
        .find(Collection::Inquiry, &Filter::new(), None)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.to_hex(), id);
    assert_eq!(stored[0].fields["phone"], Value::Null);
}

#[tokio::test]
async fn invalid_inquiries_never_reach_the_store() {
    let store = store();

    let (status, body) = post(
        app(&store),
        "/api/inquiries",
        json!({ "full_name": "No Email" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "email"]));
    assert_eq!(body["detail"][0]["type"], json!("missing"));

    let (status, body) = post(
        app(&store),
        "/api/inquiries",
        json!({ "full_name": "Bad Email", "email": "bad@" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "email"]));

    let (status, body) = post(
        app(&store),
        "/api/inquiries",
        json!({ "full_name": "Local Only", "email": "admin@localhost" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "email"]));
    assert_eq!(body["detail"][0]["type"], json!("value_error"));

    assert!(!store.has_documents(Collection::Inquiry).await.unwrap());
}

#[tokio::test]
async fn seeding_an_empty_store_then_listing() {
    let store = store();

    let (status, body) = post(app(&store), "/api/seed", json!({ "include_samples": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));

    let (_, faculties) = get(app(&store), "/api/faculties?limit=20").await;
    let faculties = items(&faculties);
    assert_eq!(faculties.len(), 2);
    assert_eq!(faculties[0]["name"], json!("Faculty of Engineering"));
    assert_eq!(faculties[1]["dean"], json!("Dr. Sari"));

    let (_, programs) = get(app(&store), "/api/programs").await;
    assert_eq!(items(&programs).len(), 2);

    let (_, news) = get(app(&store), "/api/news").await;
    assert_eq!(items(&news).len(), 1);
    assert_eq!(items(&news)[0]["author"], json!("PR Team"));
}

#[tokio::test]
async fn seeding_twice_is_safe() {
    let store = store();

    let (first, _) = post(app(&store), "/api/seed", json!({})).await;
    let (second, _) = post(app(&store), "/api/seed", json!({ "include_samples": true })).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);

    let (_, faculties) = get(app(&store), "/api/faculties").await;
    assert_eq!(items(&faculties).len(), 2);
}

#[tokio::test]
async fn seed_without_body_uses_defaults() {
    let store = store();
    let (status, _) = send(app(&store), Method::POST, "/api/seed", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(store.has_documents(Collection::Faculty).await.unwrap());
}

#[tokio::test]
async fn seed_opt_out_leaves_store_empty() {
    let store = store();
    let (status, _) = post(app(&store), "/api/seed", json!({ "include_samples": false })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(store.list_collection_names().await.unwrap().is_empty());
}

#[tokio::test]
async fn limit_one_returns_at_most_one_item() {
    let store = store();
    post(app(&store), "/api/seed", json!({})).await;

    let (status, body) = get(app(&store), "/api/faculties?limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items(&body).len(), 1);
}

#[tokio::test]
async fn non_numeric_limit_is_rejected() {
    let (status, body) = get(app(&store()), "/api/news?limit=many").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["query"]));
}

#[tokio::test]
async fn programs_filter_by_faculty_id() {
    let store = store();
    for (title, faculty_id) in [("Physics", "sci"), ("Chemistry", "sci"), ("Law", "law")] {
        let mut fields = serde_json::Map::new();
        fields.insert("title".to_owned(), json!(title));
        fields.insert("level".to_owned(), json!("Undergraduate"));
        fields.insert("faculty_id".to_owned(), json!(faculty_id));
        store.insert_one(Collection::Program, fields).await.unwrap();
    }

    let (_, body) = get(app(&store), "/api/programs?faculty_id=sci").await;
    let programs = items(&body);
    assert_eq!(programs.len(), 2);
    assert!(programs.iter().all(|p| p["faculty_id"] == json!("sci")));

    let (_, body) = get(app(&store), "/api/programs?faculty_id=nonexistent").await;
    assert_eq!(body, json!({ "items": [] }));

    let (_, body) = get(app(&store), "/api/programs?faculty_id=").await;
    assert_eq!(items(&body).len(), 3);
}

#[tokio::test]
async fn listed_items_expose_only_a_string_id() {
    let store = store();
    post(app(&store), "/api/seed", json!({})).await;

    for uri in ["/api/faculties", "/api/programs", "/api/news"] {
        let (_, body) = get(app(&store), uri).await;
        for item in items(&body) {
            assert!(item.get("_id").is_none(), "{uri} leaked _id: {item}");
            assert!(item["id"].is_string(), "{uri} has no string id: {item}");
        }
    }
}

#[tokio::test]
async fn missing_store_maps_to_500_detail() {
    let app = build_router(AppState::default());

    let (status, body) = get(app.clone(), "/api/faculties").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "detail": "Database not available. Check DATABASE_URL and DATABASE_NAME environment variables" })
    );

    let (status, _) = post(
        app,
        "/api/inquiries",
        json!({ "full_name": "Ana", "email": "ana@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn closed_store_maps_to_500_detail() {
    let store = store();
    store.close();

    let (status, body) = get(app(&store), "/api/news").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn diagnostics_describe_store_and_environment() {
    let store = store();
    post(app(&store), "/api/seed", json!({})).await;

    let (status, body) = get(app(&store), "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["backend"], json!("✅ Running"));
    assert_eq!(body["database"], json!("✅ Connected & Working"));
    assert_eq!(body["connection_status"], json!("Connected"));
    assert_eq!(body["collections"], json!(["faculty", "news", "program"]));
    for flag in ["database_url", "database_name"] {
        let value = body[flag].as_str().unwrap();
        assert!(value == "✅ Set" || value == "❌ Not Set");
    }

    let (status, body) = get(build_router(AppState::default()), "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connection_status"], json!("Not Connected"));
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn diagnostics_survive_a_broken_store() {
    let store = store();
    store.close();

    let (status, body) = get(app(&store), "/test").await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        body["database"]
            .as_str()
            .unwrap()
            .starts_with("⚠️  Connected but Error: ")
    );
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/inquiries")
        .header(header::ORIGIN, "https://www.example.edu")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app(&store()).oneshot(request).await.unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "*"
    );
}
