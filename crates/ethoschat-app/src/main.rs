use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod conversation_logger;
mod web;

use cli::Cli;
use config::{AppConfig, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = Settings::load(&cli.settings)?;
    let config = AppConfig::resolve(settings)?;

    web::run_web_server(&cli, config).await
}
