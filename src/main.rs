//! # Static Server - Entry Point
//! src/main.rs
//!
//! Carga la configuración, inicializa el logging y corre el servidor
//! hasta que el listener falle. En ese caso sale con código 1.

use static_server::config::Config;
use static_server::server::Server;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "static_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new();
    config.log_summary();

    let result = Server::bind(config).and_then(Server::run);

    if let Err(e) = result {
        error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}
