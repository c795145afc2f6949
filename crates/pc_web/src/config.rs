pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024;
pub const DEFAULT_RATE_LIMIT_PER_MINUTE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebConfig {
    pub max_request_size: usize,
    pub rate_limit_per_minute: u32,
    /// Origins allowed by CORS. Empty disables cross-origin access.
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            rate_limit_per_minute: DEFAULT_RATE_LIMIT_PER_MINUTE,
            allowed_origins: [
                "http://localhost:3000",
                "http://localhost:3001",
                "http://localhost:8000",
                "https://localhost:3000",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl WebConfig {
    /// Parses a comma-separated origin list, ignoring blanks.
    pub fn with_origins_csv(mut self, csv: &str) -> Self {
        self.allowed_origins = csv
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        self
    }
}
