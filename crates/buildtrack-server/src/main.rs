use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};

use buildtrack_server::Config;
use buildtrack_api::auth::bootstrap_admin;
use buildtrack_api::email::Mailer;
use buildtrack_api::storage::MediaStore;
use buildtrack_api::{AppState, AppStateInner};
use buildtrack_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "buildtrack=debug,buildtrack_server=debug,buildtrack_api=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Database::open(&config.db_path)?;
    if let Some((email, password)) = &config.admin {
        if !bootstrap_admin(&db, email, password)? {
            info!("Bootstrap admin {} already exists", email);
        }
    }

    let media = MediaStore::new(config.media_dir.clone(), &config.public_url).await?;

    let mailer = match config.resend_api_key.clone() {
        Some(key) => Mailer::resend(key, config.email_from.clone()),
        None => Mailer::Disabled,
    };
    if config.dev_endpoints {
        warn!("Dev endpoints enabled: /api/test-email and /api/logs are unauthenticated");
    }

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        media,
        mailer,
        app_url: config.app_url.clone(),
        dev_endpoints: config.dev_endpoints,
    });

    let app = buildtrack_api::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("BuildTrack server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
