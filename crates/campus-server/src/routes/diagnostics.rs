use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

use crate::configuration::{DATABASE_NAME_VAR, DATABASE_URL_VAR};
use crate::startup::AppState;

const MAX_COLLECTIONS: usize = 10;
const MAX_ERROR_CHARS: usize = 50;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Diagnostics {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

/// Reports store and environment status. Failures end up as text in the body,
/// the handler itself never errors.
#[tracing::instrument(name = "diagnostics", skip(app))]
pub async fn diagnostics(State(app): State<AppState>) -> Json<Diagnostics> {
    let mut report = Diagnostics {
        backend: "✅ Running".to_owned(),
        database: "⚠️  Available but not initialized".to_owned(),
        database_url: env_flag(DATABASE_URL_VAR),
        database_name: env_flag(DATABASE_NAME_VAR),
        connection_status: "Not Connected".to_owned(),
        collections: Vec::new(),
    };

    if let Some(store) = app.store.as_ref() {
        report.connection_status = "Connected".to_owned();

        match store.list_collection_names().await {
            Ok(mut names) => {
                names.truncate(MAX_COLLECTIONS);
                report.collections = names;
                report.database = "✅ Connected & Working".to_owned();
            }
            Err(err) => {
                warn!("collection listing failed: {err}");
                let short: String = err.to_string().chars().take(MAX_ERROR_CHARS).collect();
                report.database = format!("⚠️  Connected but Error: {short}");
            }
        }
    }

    Json(report)
}

fn env_flag(var: &str) -> String {
    if std::env::var(var).is_ok_and(|v| !v.is_empty()) {
        "✅ Set".to_owned()
    } else {
        "❌ Not Set".to_owned()
    }
}
