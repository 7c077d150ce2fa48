use axum::{Json, extract::State};
use campus_common::Inquiry;
use serde_json::{Value, json};
use tracing::info;

use crate::{extractors::ValidatedJson, into_http::HttpError, startup::AppState};

#[tracing::instrument(name = "inquiries.create", skip(app, inquiry))]
pub async fn create_inquiry(
    State(app): State<AppState>,
    ValidatedJson(inquiry): ValidatedJson<Inquiry>,
) -> Result<Json<Value>, HttpError> {
    let id = app.store()?.insert(&inquiry).await?;
    info!(%id, "inquiry received");

    Ok(Json(json!({ "id": id.to_hex(), "status": "received" })))
}
