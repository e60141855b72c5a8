use lecture_images::config::Config;
use lecture_images::handlers::{self, AppState};
use lecture_images::storage::{create_object_store, ImageStore};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lecture_images=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting lecture image service");
    tracing::info!("Storage type: {:?}", config.storage_type);

    let backend = create_object_store(&config).await?;
    let store_config = config.store_config()?;
    tracing::info!(
        endpoint = %store_config.endpoint_url,
        bucket = %store_config.bucket_name,
        prefix = %store_config.key_prefix,
        "Image store ready"
    );
    let images = ImageStore::new(store_config, backend)?;

    let shutdown = CancellationToken::new();
    let state = AppState {
        images,
        shutdown: shutdown.clone(),
        max_upload_size: config.max_upload_size,
    };

    let app = handlers::router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down, cancelling in-flight uploads");
    shutdown.cancel();
}
