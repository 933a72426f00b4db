use axum::routing::get;
use axum::Router;
use forge_server::config::ServerConfig;
use forge_server::session::spawn_session_loop;
use forge_server::ws::{ws_handler, AppState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::default();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let session = spawn_session_loop(&config);

    let app_state = AppState::new(session);
    let app = Router::new()
        .route("/session", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting session server on {}", config.listen_addr);
    println!("Session server listening on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .unwrap();
    axum::serve(listener, app).await.unwrap();
}
