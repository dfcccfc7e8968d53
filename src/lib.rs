pub mod app_state;
pub mod bird;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use axum::extract::Extension;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tracing::info;

//
// Re-export
//
pub use app_state::AppState;
pub use bird::{BirdClient, ResolvedMedia};
pub use config::Config;
pub use error::ApiError;
pub use routes::{DownloadRequest, MediaRequest, MediaResponse};

pub async fn run(config: Config) {
    let listen_on_port = config.listen_on_port;
    let access_key_configured = config.bird_access_key.is_some();

    let state = AppState::new(&config).expect("Failed to create app state");

    // CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/health", get(routes::health))
        .route("/bird-media", post(routes::resolve_media))
        .route("/get-media", get(routes::get_media))
        .route("/download-media", post(routes::download_media))
        .layer(axum::middleware::from_fn(middleware::log_request_outcome))
        .layer(cors)
        .layer(Extension(state));

    let addr = format!("0.0.0.0:{listen_on_port}");
    info!(access_key_configured, "Listening on {addr}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app).await.expect("Server error");
}
