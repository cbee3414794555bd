use async_trait::async_trait;

use crate::domain::comics::{GeneratedImage, PanelDimensions};
use crate::domain::errors::GenerationError;

/// A text-to-image backend. One call renders exactly one panel.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        style: &str,
        dimensions: PanelDimensions,
    ) -> Result<GeneratedImage, GenerationError>;
}
