mod handlers;
mod stream;

use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::capture::CaptureFactory;
use crate::config::ServerConfig;
use crate::input::InputDispatcher;

pub use handlers::{input_handler, video_handler};

/// Shared, read-mostly state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub dispatcher: Arc<Mutex<InputDispatcher>>,
    pub capture_factory: CaptureFactory,
}

pub fn router(state: AppState) -> Router {
    // Controllers are browser pages served from anywhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/video", get(video_handler))
        .route("/input", post(input_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until externally terminated; there is no graceful-shutdown
/// protocol beyond in-flight streams observing their own disconnect.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    axum::serve(listener, app.into_make_service()).await
}
