pub mod generate;

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};

use generate::GenerateCommand;

use crate::infrastructure::stability::{DEFAULT_ENGINE_ID, STABILITY_URL};

#[derive(Debug, Parser)]
#[command(author, version, about = "Generate comic panels with a text-to-image provider", long_about = None)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "COMICGEN_URL",
        default_value = "http://localhost:8000"
    )]
    pub api_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeCommand),

    /// Request a comic from a running server
    Generate(GenerateCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(long, env = "COMICGEN_BIND_ADDRESS", default_value = "127.0.0.1:8000")]
    pub bind_address: SocketAddr,

    /// Bearer token for the image provider
    #[arg(long, env = "STABILITY_API_KEY", hide_env_values = true)]
    pub stability_api_key: String,

    #[arg(long, env = "COMICGEN_STABILITY_URL", default_value = STABILITY_URL)]
    pub stability_url: String,

    #[arg(long, env = "COMICGEN_ENGINE_ID", default_value = DEFAULT_ENGINE_ID)]
    pub engine_id: String,

    /// Per-panel upstream timeout
    #[arg(long, env = "COMICGEN_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Issue all panel requests at once instead of one after another
    #[arg(long, env = "COMICGEN_PARALLEL_PANELS")]
    pub parallel_panels: bool,
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
