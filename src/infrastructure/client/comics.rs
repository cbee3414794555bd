use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::ComicgenClient;
use crate::domain::comics::{ComicRequest, ComicResponse};

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

pub struct ComicsClient<'a> {
    client: &'a ComicgenClient,
}

impl<'a> ComicsClient<'a> {
    pub fn new(client: &'a ComicgenClient) -> Self {
        Self { client }
    }

    pub async fn generate(&self, request: &ComicRequest) -> Result<ComicResponse> {
        let url = self.client.endpoint("generate-comic")?;
        let response = self
            .client
            .request(reqwest::Method::POST, url)
            .json(request)
            .send()
            .await?;
        self.client.handle_response(response).await
    }
}

/// Decode a `data:image/png;base64,...` URI into raw PNG bytes.
pub fn decode_data_uri(data_uri: &str) -> Result<Vec<u8>> {
    let payload = data_uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| anyhow!("expected a PNG data URI"))?;
    STANDARD
        .decode(payload)
        .context("failed to decode base64 image payload")
}

/// Write each panel as `panel-<n>.png` under `out_dir`, returning the paths in panel order.
pub async fn write_panels(response: &ComicResponse, out_dir: &Path) -> Result<Vec<PathBuf>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(response.images.len());
    for (index, image) in response.images.iter().enumerate() {
        let bytes = decode_data_uri(image).with_context(|| format!("panel {}", index + 1))?;
        let path = out_dir.join(format!("panel-{}.png", index + 1));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
