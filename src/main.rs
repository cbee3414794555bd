use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use comicgen::application::{ServerConfig, serve};
use comicgen::infrastructure::client::ComicgenClient;
use comicgen::presentation::cli::{Cli, Commands, ServeCommand, generate};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before clap parses env vars)
    let _ = dotenvy::dotenv();

    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(cmd) => run_server(cmd).await,
        Commands::Generate(cmd) => {
            let client = ComicgenClient::from_base_url(&cli.api_url)?;
            generate::run(&client, cmd).await
        }
    }
}

async fn run_server(command: ServeCommand) -> Result<()> {
    let config = ServerConfig {
        bind_address: command.bind_address,
        stability_url: command.stability_url,
        stability_api_key: command.stability_api_key,
        engine_id: command.engine_id,
        request_timeout: Duration::from_secs(command.request_timeout_secs),
        parallel_panels: command.parallel_panels,
    };

    serve(config).await
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RUST_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
