// src/api/state.rs
use crate::client::ClassificationBackend;
use crate::config::AppConfig;
use crate::controller::Controller;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub controller: Controller,
}

impl AppState {
    pub fn new(config: AppConfig, backend: Arc<dyn ClassificationBackend>) -> Self {
        let config = Arc::new(config);
        Self {
            controller: Controller::new(config.clone(), backend),
            config,
        }
    }
}
