use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use robotech_notifications::services::api::HttpBackend;
use robotech_notifications::services::session::{MemorySessionStore, SessionStore};
use robotech_notifications::ui::LogUi;
use robotech_notifications::{Config, NotificationSystem};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "robotech_notifications=debug".into());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = Config::from_env()?;

    tracing::info!("Starting Robotech notification client against {}", config.api.base_url);

    let session = Arc::new(MemorySessionStore::from_seed(&config.session));
    if let Some(user) = session.current_user() {
        tracing::info!(
            "Session user: {}",
            user.nombre_completo.as_deref().unwrap_or("(sin nombre)")
        );
    }
    if let Some(expiry) = session.token_expiry() {
        if session.is_expiring_soon(chrono::Utc::now(), chrono::Duration::minutes(5)) {
            tracing::warn!("Session token expires soon ({})", expiry);
        } else {
            tracing::debug!("Session token valid until {}", expiry);
        }
    }

    let ui = Arc::new(LogUi);
    let backend = Arc::new(HttpBackend::new(&config, session.clone(), ui.clone())?);
    let system = NotificationSystem::new(&config, backend, session, ui);

    if !system.start().await {
        tracing::warn!("No authenticated session; set ROBOTECH_TOKEN to start polling");
        return Ok(());
    }

    match system.unread_count().await {
        Ok(count) => tracing::info!("{} unread notifications on the server", count),
        Err(e) => tracing::warn!("Could not read the unread notification count: {}", e),
    }

    shutdown_signal().await;

    tracing::info!("Shutdown signal received, stopping notification polling");
    system.stop();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::error!("Failed to bind SIGTERM: {}", e);
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
