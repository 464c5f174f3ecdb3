mod app;
mod config;
mod fixtures;
mod routes;
mod state;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let fixture_dir = config::fixture_dir();
    let static_dir = config::static_dir();

    let snapshots = fixtures::load_or_demo(&fixture_dir);
    for snapshot in &snapshots {
        let grid = snapshot.grid();
        let out_of_bounds = snapshot
            .cells
            .iter()
            .filter(|cell| !grid.contains(cell.x, cell.y))
            .count();
        if out_of_bounds > 0 {
            tracing::warn!(
                id = %snapshot.map.id,
                out_of_bounds,
                "map fixture has cells outside its grid"
            );
        }
    }

    let state = AppState::new(snapshots);
    tracing::info!(
        maps = state.maps.len(),
        fixture_dir = %fixture_dir.display(),
        static_dir = %static_dir.display(),
        "map store ready"
    );

    let app = app::build_app(state, &static_dir);

    let addr = format!("0.0.0.0:{}", config::server_port());
    tracing::info!("Store map server listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
