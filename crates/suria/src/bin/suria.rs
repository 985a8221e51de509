use argh::FromArgs;
use axum::{
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use rust_embed::RustEmbed;
use std::sync::Arc;
use std::time::Duration;

use suria::api::{api_router, AppState};
use suria::config::Config;
use suria::forecast::ForecastClient;
use suria::genai::GeminiClient;

#[derive(RustEmbed)]
#[folder = "../../dashboard/dist/"]
struct Assets;

/// Suria solar dashboard server
#[derive(FromArgs)]
struct Args {
    /// path to the configuration file (optional, defaults apply)
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// HTTP listen port (overrides the config file)
    #[argh(option, short = 'p')]
    port: Option<u16>,
}

/// Static file handler: serve embedded files with MIME types, SPA fallback to index.html
async fn static_handler(uri: Uri) -> Response {
    let mut path = uri.path().trim_start_matches('/');

    // Empty path should serve index.html
    if path.is_empty() {
        path = "index.html";
    }

    // Try the exact path first
    if let Some(file) = Assets::get(path) {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime.as_ref())],
            file.data.into_owned(),
        )
            .into_response();
    }

    // SPA fallback to index.html for routes not found
    if let Some(file) = Assets::get("index.html") {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            file.data.into_owned(),
        )
            .into_response();
    }

    // If even index.html is missing, return 404
    StatusCode::NOT_FOUND.into_response()
}

async fn health() -> &'static str {
    "ok"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Args = argh::from_env();

    let config = if let Some(config_path) = &args.config {
        match Config::from_file(config_path) {
            Ok(c) => c,
            Err(e) => {
                log::error!("Failed to load config from '{}': {}", config_path, e);
                std::process::exit(1);
            }
        }
    } else {
        log::info!("No config file specified, using defaults");
        Config::default()
    };

    let generator = match GeminiClient::from_env(config.genai.model.as_deref()) {
        Ok(g) => g,
        Err(e) => {
            log::error!("Failed to create generation client: {}", e);
            std::process::exit(1);
        }
    };

    let feed = ForecastClient::new(
        &config.feed.url,
        Duration::from_secs(config.feed.timeout_secs),
    )?;

    let state = Arc::new(AppState {
        feed,
        generator,
        default_location: config.feed.default_location.clone(),
    });

    let app = Router::new()
        .nest("/api/v1", api_router(state))
        .route("/health", get(health))
        .fallback(static_handler);

    let port = args.port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", config.server.host, port);
    log::info!("Dashboard server listening on http://{}", addr);
    log::info!("Forecast feed: {}", config.feed.url);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await.expect("failed to install Ctrl+C handler");

    log::info!("Shutdown signal received");
}
