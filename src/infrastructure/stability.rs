use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::comics::{GeneratedImage, PanelDimensions};
use crate::domain::errors::GenerationError;
use crate::domain::generator::ImageGenerator;

pub const STABILITY_URL: &str = "https://api.stability.ai";
pub const DEFAULT_ENGINE_ID: &str = "stable-diffusion-xl-1024-v1-0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = "Comicgen/1.0";

const CFG_SCALE: u32 = 7;
const SAMPLES: u32 = 1;
const STEPS: u32 = 30;

pub struct StabilityConfig {
    pub base_url: String,
    pub api_key: String,
    pub engine_id: String,
    pub timeout: Duration,
}

/// Text-to-image client for the Stability v1 generation API.
pub struct StabilityClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: String,
}

impl StabilityClient {
    pub fn new(config: StabilityConfig) -> Result<Self> {
        let mut base = Url::parse(&config.base_url)
            .with_context(|| format!("invalid image provider url: {}", config.base_url))?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path().trim_end_matches('/')));
        }

        let endpoint = base
            .join(&format!(
                "v1/generation/{}/text-to-image",
                config.engine_id
            ))
            .with_context(|| format!("invalid engine id: {}", config.engine_id))?;

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .context("failed to configure HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ImageGenerator for StabilityClient {
    async fn generate(
        &self,
        prompt: &str,
        style: &str,
        dimensions: PanelDimensions,
    ) -> Result<GeneratedImage, GenerationError> {
        let request_body = TextToImageRequest::new(prompt, style, dimensions);

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%status, %dimensions, "image provider responded");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        extract_first_artifact(&body)
    }
}

fn extract_first_artifact(body: &str) -> Result<GeneratedImage, GenerationError> {
    let parsed: TextToImageResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

    let artifact = parsed
        .artifacts
        .into_iter()
        .next()
        .ok_or(GenerationError::NoArtifacts)?;

    if artifact.finish_reason.as_deref() == Some("ERROR") {
        return Err(GenerationError::ArtifactFailed);
    }

    Ok(GeneratedImage::from_base64(artifact.base64))
}

fn comic_prompt(prompt: &str, style: &str) -> String {
    format!("{prompt}, {style} comic style")
}

// --- Stability API types ---

#[derive(Debug, Serialize)]
struct TextToImageRequest {
    text_prompts: Vec<TextPrompt>,
    cfg_scale: u32,
    height: u32,
    width: u32,
    samples: u32,
    steps: u32,
}

impl TextToImageRequest {
    fn new(prompt: &str, style: &str, dimensions: PanelDimensions) -> Self {
        Self {
            text_prompts: vec![TextPrompt {
                text: comic_prompt(prompt, style),
            }],
            cfg_scale: CFG_SCALE,
            height: dimensions.height,
            width: dimensions.width,
            samples: SAMPLES,
            steps: STEPS,
        }
    }
}

#[derive(Debug, Serialize)]
struct TextPrompt {
    text: String,
}

#[derive(Debug, Deserialize)]
struct TextToImageResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: String,
    #[serde(default, rename = "finishReason")]
    finish_reason: Option<String>,
}
