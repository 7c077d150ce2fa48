use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_common::FieldError;
use campus_store::StoreError;
use color_eyre::Report;
use serde_json::json;
use std::{fmt, io::Write};
use termcolor::{ColorChoice, StandardStream};
use tracing::{error, warn};

/// Everything a handler can fail with.
///
/// `Validation` is raised before the store is touched and carries one entry
/// per rejected field. `Internal` collapses any store failure into its message.
#[derive(Debug)]
pub enum HttpError {
    Internal { detail: String },
    Validation(Vec<FieldError>),
}

impl HttpError {
    pub fn from_report(err: Report) -> Self {
        error!("HTTP handler error: {}", err.root_cause());

        if let Some(bt) = err
            .handler()
            .downcast_ref::<color_eyre::Handler>()
            .and_then(|h| h.backtrace())
        {
            error!("Backtrace:");
            let mut stream = StandardStream::stderr(ColorChoice::Auto);
            let _ = writeln!(&mut stream, "{bt:?}");
        }

        HttpError::Internal {
            detail: err.to_string(),
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        warn!(fields = errors.len(), "request rejected by validation");
        HttpError::Validation(errors)
    }
}

macro_rules! impl_from {
    ($from:ty) => {
        impl From<$from> for HttpError {
            fn from(err: $from) -> Self {
                let report = color_eyre::Report::from(err);
                Self::from_report(report)
            }
        }
    };
}

impl_from!(StoreError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        match self {
            HttpError::Internal { detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": detail })),
            )
                .into_response(),
            HttpError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "detail": errors })),
            )
                .into_response(),
        }
    }
}

impl std::error::Error for HttpError {}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::Internal { detail } => write!(f, "HttpError: {detail}"),
            HttpError::Validation(errors) => {
                write!(f, "HttpError: {} invalid field(s)", errors.len())
            }
        }
    }
}
