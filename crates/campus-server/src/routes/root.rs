use axum::Json;
use serde_json::{Value, json};

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "University API is running" }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
