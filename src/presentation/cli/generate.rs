use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::print_json;
use crate::domain::comics::{ComicRequest, DEFAULT_NUM_PANELS, DEFAULT_STYLE, PanelDimensions};
use crate::infrastructure::client::ComicgenClient;
use crate::infrastructure::client::comics::write_panels;

#[derive(Debug, Args)]
pub struct GenerateCommand {
    #[arg(long)]
    pub prompt: String,

    #[arg(long, default_value = DEFAULT_STYLE)]
    pub style: String,

    #[arg(long, default_value_t = 0)]
    pub grid_type: i64,

    #[arg(long, default_value_t = DEFAULT_NUM_PANELS)]
    pub num_panels: i64,

    /// Panel size as WIDTHxHEIGHT, repeat once per panel
    #[arg(long = "panel-size", value_parser = parse_panel_size)]
    pub panel_sizes: Vec<PanelDimensions>,

    /// Write panel-<n>.png files here instead of printing the JSON response
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

pub async fn run(client: &ComicgenClient, command: GenerateCommand) -> Result<()> {
    let request = ComicRequest {
        style: Some(command.style),
        grid_type: command.grid_type,
        num_panels: command.num_panels,
        panel_sizes: command.panel_sizes.into_iter().map(Some).collect(),
        ..ComicRequest::new(command.prompt)
    };

    let response = client.comics().generate(&request).await?;

    match command.out_dir {
        Some(out_dir) => {
            let written = write_panels(&response, &out_dir).await?;
            for path in written {
                println!("{}", path.display());
            }
            Ok(())
        }
        None => print_json(&response),
    }
}

fn parse_panel_size(value: &str) -> Result<PanelDimensions, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value}"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid width {width}: {e}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("invalid height {height}: {e}"))?;
    Ok(PanelDimensions::new(width, height))
}
