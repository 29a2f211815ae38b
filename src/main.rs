use axum::{Router, routing::get};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use ledgerly::api::{handlers, openapi::ApiDoc};
use ledgerly::codec::AeadCodec;
use ledgerly::config::CONFIG;
use ledgerly::core::service::LedgerService;
use ledgerly::infrastructure::cache::in_memory::InMemoryCache;
use ledgerly::infrastructure::storage::in_memory::InMemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(CONFIG.log_level.as_str())
        .init();

    // Wire the store handle explicitly: codec -> store -> cache -> service.
    // The handle lives for the whole process and is dropped at shutdown.
    let codec = Arc::new(AeadCodec::new(&CONFIG.encryption_secret));
    let storage = InMemoryStore::new(codec.clone());
    let cache = InMemoryCache::new();
    let service = Arc::new(LedgerService::new(
        storage,
        cache,
        codec,
        CONFIG.jwt_secret.clone(),
    ));

    let app = Router::new()
        // add / route with a simple health check
        .route("/", get(|| async { "OK" }))
        .merge(handlers::api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new()) // Gzip compression
        .layer(TimeoutLayer::new(Duration::from_secs(30))) // 30-second timeout
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http()) // Request tracing
        ;

    // Start server
    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
