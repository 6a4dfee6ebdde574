use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use local_ip_address::local_ip;
use log::info;
use tokio::net::TcpListener;

use spyglass::capture::ScreenCapture;
use spyglass::config::ServerConfig;
use spyglass::input::InputDispatcher;
use spyglass::server::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = ServerConfig::from_env();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("invalid RA_HOST or PORT")?;

    let state = AppState {
        config: config.clone(),
        dispatcher: Arc::new(Mutex::new(InputDispatcher::new())),
        capture_factory: ScreenCapture::factory(),
    };

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    let ip = match local_ip() {
        Ok(ip) => ip.to_string(),
        Err(_) => "127.0.0.1".to_string(),
    };
    info!(
        "{} sharing screen on http://{}:{}/video (fps={}, scale={}, quality={})",
        gethostname::gethostname().to_string_lossy(),
        ip,
        config.port,
        config.fps,
        config.scale,
        config.quality
    );
    info!("Listening on {}", addr);

    server::serve(listener, state).await.context("server failed")?;
    Ok(())
}
