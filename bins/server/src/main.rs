//! Biblio API Server
//!
//! Main entry point for the Biblio lending service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use biblio_api::{AppState, create_router};
use biblio_db::connect;
use biblio_shared::{AppConfig, SessionTokenConfig, SessionTokenService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biblio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create session token service
    let tokens = SessionTokenService::new(SessionTokenConfig {
        secret: config.session.secret.clone(),
        expires_minutes: config.session.expiry_minutes,
    });

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        tokens: Arc::new(tokens),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
