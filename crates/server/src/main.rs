//! Scribe server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use scribe_api::{AppState, router as api_router};
use scribe_common::Config;
use scribe_core::{BlogService, ImagePathService, ImageStore};
use scribe_db::repositories::{
    ArticleRepository, CompiledDocumentRepository, ImageRepository, TagRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting scribe server...");

    // Load configuration (.env first, then config files + environment)
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Connect to database
    let db = scribe_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    scribe_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let article_repo = ArticleRepository::new(Arc::clone(&db));
    let compiled_repo = CompiledDocumentRepository::new(Arc::clone(&db));
    let tag_repo = TagRepository::new(Arc::clone(&db));
    let image_repo = ImageRepository::new(Arc::clone(&db));

    // Initialize services
    let store = ImageStore::new(&config.images);
    let blog_service = BlogService::new(
        article_repo,
        compiled_repo,
        tag_repo,
        config.blog.page_size,
    );
    let image_path_service = ImagePathService::new(image_repo, store);

    let state = AppState {
        blog_service,
        image_path_service,
    };

    // Build router
    let app = Router::new()
        .merge(api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
