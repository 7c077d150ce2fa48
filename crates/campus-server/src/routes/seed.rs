use axum::{Json, extract::State};
use campus_common::SeedRequest;
use campus_store::seed::seed_samples;
use serde_json::{Value, json};

use crate::{extractors::ValidatedJson, into_http::HttpError, startup::AppState};

#[tracing::instrument(name = "seed", skip(app))]
pub async fn seed_content(
    State(app): State<AppState>,
    ValidatedJson(body): ValidatedJson<SeedRequest>,
) -> Result<Json<Value>, HttpError> {
    seed_samples(app.store()?, body.include_samples).await?;

    Ok(Json(json!({ "status": "ok" })))
}
