use clap::Parser;

/// Command-line and environment configuration for the server binary.
#[derive(Debug, Parser)]
#[command(name = "carpool_server", about = "Carpool-optimizing event backend")]
pub struct ServerArgs {
    /// Port to listen on.
    #[arg(long, default_value_t = 3000, env = "CARPOOL_PORT")]
    pub port: u16,

    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,

    /// Mapbox access token. Without one the server falls back to
    /// straight-line route estimates.
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN")]
    pub mapbox_token: Option<String>,

    /// Number of demo users to seed into the in-memory store.
    #[arg(long, default_value_t = 12)]
    pub seed_users: u64,

    /// RNG seed for the demo dataset.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}
