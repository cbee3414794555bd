use std::sync::Arc;

use crate::application::services::ComicService;
use crate::domain::generator::ImageGenerator;

/// Settings that vary between production and test environments.
pub struct AppStateConfig {
    pub generator: Arc<dyn ImageGenerator>,
    pub parallel_panels: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub comic_service: ComicService,
}

impl AppState {
    pub fn new(config: AppStateConfig) -> Self {
        Self {
            comic_service: ComicService::new(config.generator, config.parallel_panels),
        }
    }
}
