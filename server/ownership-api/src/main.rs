//! Binary entrypoint for the ownership API.

use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};

use ownership_api::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  fmt().with_env_filter(env_filter).init();

  let snapshot_path =
    std::env::var("SNAPSHOT_PATH").unwrap_or_else(|_| "ownership-snapshot.json".into());
  let port: u16 = std::env::var("PORT")
    .unwrap_or_else(|_| "5005".into())
    .parse()
    .map_err(|e| format!("PORT must be a valid u16: {}", e))?;

  let state = AppState::load(&snapshot_path)?;
  let app = ownership_api::router(state);

  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  tracing::info!(%addr, snapshot = %snapshot_path, "ownership-api listening");

  let listener = tokio::net::TcpListener::bind(addr).await?;
  axum::serve(listener, app).await?;

  Ok(())
}
