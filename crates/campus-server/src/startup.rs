use axum::{
    Router,
    body::Body,
    http::Request,
    routing::{get, post},
    serve::Serve,
};
use campus_store::{DocumentStore, StoreError};
use color_eyre::owo_colors::OwoColorize;
use eyre::Result;
use std::io;
use std::net::IpAddr;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_request_id::{RequestId, RequestIdLayer};
use tracing::{Level, error, error_span, info, warn};

use crate::ApplicationSettings;
use crate::routes::{
    create_inquiry, diagnostics, health_check, list_faculties, list_news, list_programs, root,
    seed_content,
};

/// Shared by every handler. `store` is `None` when the database variables are
/// missing or the store failed to open.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub store: Option<DocumentStore>,
}

impl AppState {
    pub fn new(store: Option<DocumentStore>) -> Self {
        Self { store }
    }

    /// # Errors
    /// Returns [`StoreError::NotConfigured`] when running without a database.
    pub fn store(&self) -> Result<&DocumentStore, StoreError> {
        self.store.as_ref().ok_or(StoreError::NotConfigured)
    }
}

#[derive(Debug)]
pub struct Application {
    port: u16,
    host: IpAddr,
    server: Serve<Router, Router>,
}

impl Application {
    /// Binds the configured address. If the port is taken, an ephemeral one is used instead.
    ///
    /// # Errors
    /// Fails when no port can be bound or the local address can't be read.
    pub async fn build(configuration: &ApplicationSettings, state: AppState) -> Result<Self> {
        let address = format!("{}:{}", configuration.host, configuration.port);

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => listener,
            Err(err) => {
                error!("{err}. Trying another port...");
                match TcpListener::bind(format!("{}:0", configuration.host)).await {
                    Ok(listener) => listener,
                    Err(err) => {
                        error!("No ports available, shutting down...");
                        return Err(err.into());
                    }
                }
            }
        };

        let port = listener.local_addr()?.port();
        let host = configuration.host;

        let server = axum::serve(listener, build_router(state));

        Ok(Self { port, host, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn host(&self) -> String {
        self.host.to_string()
    }

    /// # Errors
    /// Returns any I/O error raised while serving.
    pub async fn run_until_stopped(self) -> io::Result<()> {
        self.server.with_graceful_shutdown(shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install the Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!("Failed to install the SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("ctrl+c received, shutting down."),
        () = terminate => info!("SIGTERM received, shutting down."),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/test", get(diagnostics))
        .route("/api/health", get(health_check))
        .route("/api/faculties", get(list_faculties))
        .route("/api/programs", get(list_programs))
        .route("/api/news", get(list_news))
        .route("/api/inquiries", post(create_inquiry))
        .route("/api/seed", post(seed_content))
        .with_state(state)
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(RequestIdLayer)
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            let request_id = request
                                .extensions()
                                .get::<RequestId>()
                                .map_or_else(|| "unknown".into(), ToString::to_string);

                            error_span!(
                                "request",
                                id = %request_id,
                                method = %request.method().blue().bold(),
                                uri = %request.uri()
                            )
                        })
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                ),
        )
        .layer(CompressionLayer::new())
}

pub async fn run_server(
    configuration: ApplicationSettings,
    state: AppState,
    start: Instant,
) -> Result<()> {
    let store = state.store.clone();

    let app = match Application::build(&configuration, state).await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start the server: {:?}", e);
            return Err(e);
        }
    };

    let url = format!("http://{}:{}", app.host(), app.port());

    println!(
        "\n\n  {} {} ready in {} ms\n",
        configuration.name.to_uppercase().bold().bright_green(),
        format!("v{}", env!("CARGO_PKG_VERSION")).green(),
        start.elapsed().as_millis().bold().bright_white(),
    );

    println!(
        "  {}  {}:  {}\n\n",
        "➜".bold().bright_green(),
        "Local".bold().bright_white(),
        url.bright_cyan().underline()
    );

    let result = app.run_until_stopped().await;

    if let Some(store) = store {
        store.close();
    }

    if let Err(e) = result {
        error!("Error while running the HTTP server: {:?}", e);
        return Err(e.into());
    }

    Ok(())
}
