//! cafeteria-server — cafeteria ordering backend
//!
//! Long-running HTTP service: user registration/login, a fixed menu, and
//! per-user order management.

use cafeteria_server::{AppState, Config, api};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cafeteria_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting cafeteria-server (env: {})", config.environment);

    // Connect, migrate, build shared state
    let state = AppState::new(&config).await?;

    // Periodic revocation-set sweep (every 5 minutes)
    let revoked = state.revoked.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            revoked.sweep();
        }
    });

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("cafeteria-server listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
