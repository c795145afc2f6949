use pc_pipeline::ColumnService;
use std::sync::Arc;

use crate::config::WebConfig;
use crate::rate_limit::RateLimiter;

#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<ColumnService>,
    pub limiter: Arc<RateLimiter>,
    pub max_request_size: usize,
}

impl AppState {
    pub fn new(service: ColumnService, config: &WebConfig) -> Self {
        Self {
            service: Arc::new(service),
            limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
            max_request_size: config.max_request_size,
        }
    }
}
