use axum::{Json, extract::State};
use campus_common::Collection;
use campus_store::{DocumentStore, Filter};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{extractors::QueryParams, into_http::HttpError, startup::AppState};

pub const FACULTIES_LIMIT: u64 = 20;
pub const PROGRAMS_LIMIT: u64 = 50;
pub const NEWS_LIMIT: u64 = 10;

#[derive(Deserialize, Debug, Default)]
pub struct ListParams {
    limit: Option<i64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProgramParams {
    limit: Option<i64>,
    faculty_id: Option<String>,
}

/// `0` lifts the limit, negative values count like their absolute value.
pub fn effective_limit(requested: Option<i64>, default: u64) -> Option<u64> {
    match requested {
        None => Some(default),
        Some(0) => None,
        Some(n) => Some(n.unsigned_abs()),
    }
}

async fn list_items(
    store: &DocumentStore,
    collection: Collection,
    filter: &Filter,
    limit: Option<u64>,
) -> Result<Json<Value>, HttpError> {
    let items: Vec<Value> = store
        .find(collection, filter, limit)
        .await?
        .into_iter()
        .map(|doc| Value::Object(doc.into_item()))
        .collect();

    Ok(Json(json!({ "items": items })))
}

#[tracing::instrument(name = "faculties.list", skip(app))]
pub async fn list_faculties(
    State(app): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, HttpError> {
    list_items(
        app.store()?,
        Collection::Faculty,
        &Filter::new(),
        effective_limit(params.limit, FACULTIES_LIMIT),
    )
    .await
}

#[tracing::instrument(name = "programs.list", skip(app))]
pub async fn list_programs(
    State(app): State<AppState>,
    QueryParams(params): QueryParams<ProgramParams>,
) -> Result<Json<Value>, HttpError> {
    let filter = match params.faculty_id {
        Some(faculty_id) if !faculty_id.is_empty() => Filter::new().eq("faculty_id", faculty_id),
        _ => Filter::new(),
    };

    list_items(
        app.store()?,
        Collection::Program,
        &filter,
        effective_limit(params.limit, PROGRAMS_LIMIT),
    )
    .await
}

#[tracing::instrument(name = "news.list", skip(app))]
pub async fn list_news(
    State(app): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Value>, HttpError> {
    list_items(
        app.store()?,
        Collection::News,
        &Filter::new(),
        effective_limit(params.limit, NEWS_LIMIT),
    )
    .await
}
