use std::net::SocketAddr;

use octocrab::models::AppId;
use octocrab::Octocrab;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fork_sync::github::OctocrabApi;
use fork_sync::server::{build_router, AppState};
use fork_sync::sync::SyncLimits;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fork_sync=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_id: u64 = read_env("FORK_SYNC_APP_ID")
        .parse()
        .expect("FORK_SYNC_APP_ID must be a numeric GitHub App ID");
    let key_path = read_env("FORK_SYNC_PRIVATE_KEY_PATH");
    let webhook_secret = read_env("FORK_SYNC_WEBHOOK_SECRET");
    let listen_addr: SocketAddr = std::env::var("FORK_SYNC_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()
        .expect("FORK_SYNC_LISTEN_ADDR must be a socket address");

    let key_pem = std::fs::read(&key_path)
        .unwrap_or_else(|e| panic!("failed to read private key at {}: {}", key_path, e));
    let key = jsonwebtoken::EncodingKey::from_rsa_pem(&key_pem)
        .expect("private key must be a PEM-encoded RSA key");

    let octocrab = Octocrab::builder()
        .app(AppId(app_id), key)
        .build()
        .expect("failed to build GitHub app client");
    let client = OctocrabApi::new(octocrab);

    let state = AppState::new(webhook_secret.into_bytes(), client, SyncLimits::default());
    let app = build_router(state);

    tracing::info!("listening on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");
}

fn read_env(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| panic!("{} must be set", name))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutting down");
}
