use axum::routing::get;
use axum::Router;
use tokio::sync::{broadcast, mpsc};
use tower_http::cors::CorsLayer;
use volley_server::config::ServerConfig;
use volley_server::game_loop::{run_animation_loop, LoopCommand, LoopHandle};
use volley_server::ws::{ws_handler, AppState};
use volley_shared::frame::Frame;
use volley_shared::table::PositionTable;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();

    // Validate configuration and the compiled-in table before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }
    if let Err(e) = PositionTable::standard().validate() {
        eprintln!("Invalid position table: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();

    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>(config.command_capacity);
    let (frame_tx, _) = broadcast::channel::<Frame>(config.frame_capacity);

    // Spawn animation loop
    let loop_frame_tx = frame_tx.clone();
    tokio::spawn(async move {
        run_animation_loop(cmd_rx, loop_frame_tx, config).await;
    });

    // Axum app
    let app_state = AppState {
        handle: LoopHandle::new(cmd_tx),
        frame_tx,
    };
    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting rotation server on {}", listen_addr);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
