use std::future::Future;
use std::path::PathBuf;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use common::log;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use crate::broadcaster::Broadcaster;
use crate::game_service::GameService;
use crate::ws_handler::handle_websocket;

#[derive(Clone)]
pub struct WebServerState {
    pub game_service: GameService<Broadcaster>,
    pub broadcaster: Broadcaster,
}

pub fn build_router(state: WebServerState, static_files_path: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_upgrade_handler))
        .fallback_service(ServeDir::new(static_files_path))
        .layer(cors)
        .with_state(state)
}

pub async fn run_web_server(
    state: WebServerState,
    listen_address: &str,
    static_files_path: PathBuf,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), String> {
    let app = build_router(state, static_files_path.clone());

    let listener = tokio::net::TcpListener::bind(listen_address)
        .await
        .map_err(|e| format!("Failed to bind web server address {}: {}", listen_address, e))?;
    log!(
        "Web server listening on {}, serving {}",
        listen_address,
        static_files_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Web server error: {}", e))
}

async fn ws_upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<WebServerState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}
