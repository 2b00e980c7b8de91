use std::sync::Arc;

use opsboard_app::{AppConfig, AppServices};

#[derive(Clone)]
pub struct HttpState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl HttpState {
    pub fn new(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self {
            config: Arc::new(config),
            services,
        }
    }
}
