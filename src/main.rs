use std::error::Error;

use clap::Parser;
use cli::Cli;
use config::ServerConfig;
use tracing::Level;

pub mod cli;
pub mod config;
pub mod protocol;
pub mod record;
pub mod server;
pub mod session;
pub mod store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    server::run(ServerConfig::from(cli)).await?;

    Ok(())
}
