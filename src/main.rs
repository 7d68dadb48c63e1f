use inkbook_admin::{router, AppState, BackendClient, Config};
use std::net::SocketAddr;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let backend = BackendClient::new(&config.backend)?;
    info!("booking api at {}", config.backend.base_url);

    let user = match &config.credentials {
        Some(credentials) => match backend.login(credentials).await {
            Ok(user) => {
                info!(username = %user.username, role = ?user.role, "signed in to booking api");
                Some(user)
            }
            Err(err) => {
                error!("login to booking api failed: {err}");
                None
            }
        },
        None => {
            warn!("no booking api credentials configured; relying on an open session");
            None
        }
    };

    let state = AppState::new(backend, user);
    state.refresh().await;

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
