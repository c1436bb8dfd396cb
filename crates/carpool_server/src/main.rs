//! HTTP surface for the carpool optimizer.
//!
//! Thin by design: routing, parameter parsing, and error mapping live here;
//! all carpool logic stays in `carpool_core`.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal::{
    ctrl_c,
    unix::{signal, SignalKind},
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod config;
mod error;
mod routes;
mod state;

use config::ServerArgs;
use state::AppState;

#[tokio::main]
async fn main() {
    let args = ServerArgs::parse();
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let state = AppState::new(&args);
    let app = routes::router(state);

    let address = format!("{}:{}", args.bind, args.port);
    let listener = TcpListener::bind(&address)
        .await
        .expect("failed to bind listener");
    info!("listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    info!("server shut down");
}

async fn shutdown_signal() {
    let interrupt = async {
        ctrl_c().await.expect("failed to install ctrl-c handler");
    };
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}
