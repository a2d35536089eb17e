//! # claimdesk-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the claimdesk API.
//! Binds to a configurable port (default 8080).

use claimdesk_api::state::{AppConfig, AppState};
use claimdesk_core::Role;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!(
            "JWT_SECRET not set — generating an ephemeral secret. \
             Tokens issued by this process will not verify after restart."
        );
        format!(
            "{}{}",
            uuid::Uuid::new_v4().simple(),
            uuid::Uuid::new_v4().simple()
        )
    });

    let token_ttl_secs: i64 = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(86_400);

    let config = AppConfig {
        port,
        jwt_secret,
        token_ttl_secs,
    };

    // Initialize database pool (optional — absent means in-memory only).
    let db_pool = claimdesk_api::db::init_pool().await.map_err(|e| {
        tracing::error!("Database initialization failed: {e}");
        e
    })?;

    // Attempt to create the notification gateway client from environment.
    let notifier = match claimdesk_notify::NotifyConfig::from_env() {
        Ok(notify_config) => match claimdesk_notify::NotifyClient::new(notify_config) {
            Ok(client) => {
                tracing::info!("notification gateway client configured");
                Some(client)
            }
            Err(e) => {
                tracing::error!("Failed to create notification client: {e}");
                return Err(e.into());
            }
        },
        Err(e) => {
            tracing::warn!("Notification gateway not configured: {e}. Decision notifications will be skipped.");
            None
        }
    };

    let state = AppState::with_config(config, notifier, db_pool);

    // Hydrate in-memory stores from the database (if connected).
    state.hydrate_from_db().await.map_err(|e| {
        tracing::error!("Database hydration failed: {e}");
        e
    })?;

    // Seed the admin account from the environment, if configured and
    // not already present.
    if let (Ok(contact), Ok(password)) = (
        std::env::var("ADMIN_CONTACT"),
        std::env::var("ADMIN_PASSWORD"),
    ) {
        if state.account_by_contact(&contact).is_none() {
            let name =
                std::env::var("ADMIN_NAME").unwrap_or_else(|_| "Administrator".to_string());
            let admin = state
                .create_account(&name, &contact, &password, Role::Admin)
                .map_err(|e| format!("admin seed failed: {e}"))?;
            if let Some(pool) = &state.db_pool {
                claimdesk_api::db::accounts::insert(pool, &admin).await?;
            }
            tracing::info!(contact, "seeded admin account");
        }
    }

    let app = claimdesk_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("claimdesk API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
