#![warn(clippy::pedantic, clippy::all, clippy::nursery)]
#![allow(clippy::single_match_else)]

use crate::{
    config::RuntimeConfiguration,
    error::{BindListenerSnafu, RosterResult, ServeSnafu},
    routes::router,
    state::RosterState,
};
use snafu::ResultExt;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::{net::TcpListener, signal};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[macro_use]
extern crate tracing;

mod client;
mod config;
mod data;
mod error;
mod maud_conveniences;
mod routes;
mod state;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    warn!("signal received, starting graceful shutdown");
}

async fn run() -> RosterResult<()> {
    let config = RuntimeConfiguration::new()?;
    let state = RosterState::new(SqlitePoolOptions::new().max_connections(5), config).await?;

    let app = router(state.clone());

    let server_address = state.config().server_address();
    let listener = TcpListener::bind(&server_address)
        .await
        .context(BindListenerSnafu {
            address: server_address.clone(),
        })?;

    info!(?server_address, port = state.config().port(), "Listening");
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context(ServeSnafu);

    //close storage whether or not serving went well
    state.sensible_shutdown().await;
    served
}

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();

    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .finish(),
    )
    .expect("unable to set tracing subscriber");

    info!("`tracing` online");
    match dotenv {
        Ok(path) => info!(?path, "Loaded env vars"),
        Err(e) if e.not_found() => debug!("No .env file, using the environment as is"),
        Err(e) => warn!(?e, "Unable to load .env file"),
    }

    if let Err(e) = run().await {
        error!(?e, "Fatal error");
        std::process::exit(1);
    }
}
