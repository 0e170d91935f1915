use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use trip_station::config::{Args, StationConfig};
use trip_station::station;
use trip_station::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match StationConfig::from_args(Args::parse()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let handle = match station::start(&config).await {
        Ok(handle) => handle,
        Err(e) => {
            error!(station = %config.name, error = %e, "station failed to start");
            return ExitCode::FAILURE;
        }
    };

    let app = create_router(AppState::new(handle));

    let addr = config.tcp_address();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind HTTP listener");
            return ExitCode::FAILURE;
        }
    };

    info!(
        station = %config.name,
        http = %addr,
        udp = %config.udp_address(),
        neighbours = ?config.neighbour_addresses(),
        "station listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "HTTP server failed");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
