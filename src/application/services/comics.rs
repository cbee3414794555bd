use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::domain::comics::{ComicPlan, GeneratedImage, PanelDimensions};
use crate::domain::errors::GenerationError;
use crate::domain::generator::ImageGenerator;

/// Renders every panel of a validated comic request.
#[derive(Clone)]
pub struct ComicService {
    generator: Arc<dyn ImageGenerator>,
    parallel_panels: bool,
}

impl ComicService {
    pub fn new(generator: Arc<dyn ImageGenerator>, parallel_panels: bool) -> Self {
        Self {
            generator,
            parallel_panels,
        }
    }

    /// Returns one image per panel, in panel order, or the first failure.
    pub async fn generate(&self, plan: &ComicPlan) -> Result<Vec<GeneratedImage>, GenerationError> {
        info!(
            panels = plan.panels.len(),
            grid_type = i64::from(plan.grid_type),
            parallel = self.parallel_panels,
            "generating comic"
        );

        if self.parallel_panels {
            let calls = plan
                .panels
                .iter()
                .enumerate()
                .map(|(index, dims)| self.render_panel(plan, index, *dims));
            return try_join_all(calls).await;
        }

        let mut images = Vec::with_capacity(plan.panels.len());
        for (index, dims) in plan.panels.iter().enumerate() {
            images.push(self.render_panel(plan, index, *dims).await?);
        }
        Ok(images)
    }

    async fn render_panel(
        &self,
        plan: &ComicPlan,
        index: usize,
        dimensions: PanelDimensions,
    ) -> Result<GeneratedImage, GenerationError> {
        debug!(panel = index + 1, %dimensions, "requesting panel");
        self.generator
            .generate(&plan.prompt, &plan.style, dimensions)
            .await
            .inspect_err(|err| {
                warn!(panel = index + 1, error = %err, "panel generation failed");
            })
    }
}
