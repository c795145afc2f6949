use thiserror::Error;

/// Message shown to callers for anything that is not their fault.
pub const GENERIC_FAILURE: &str = "컬럼 생성 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("News provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("No news found for query: {0}")]
    NoResultsFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Upstream failure worth another attempt (network, timeout, 429, 5xx).
    #[error("Transient upstream failure: {0}")]
    Transient(String),

    /// Upstream refused the request (bad request, auth); retrying cannot help.
    #[error("Upstream rejected request: {0}")]
    Rejected(String),

    #[error("Request deadline exceeded after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transient(_) => true,
            Error::Http(e) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    return true;
                }
                e.status()
                    .map(|s| s.is_server_error() || s.as_u16() == 429)
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Sanitized text for the external response. Never carries upstream bodies.
    pub fn public_message(&self) -> String {
        match self {
            Error::InvalidInput(reason) => format!("입력 데이터가 올바르지 않습니다: {}", reason),
            Error::RateLimited => "요청 한도를 초과했습니다. 잠시 후 다시 시도해주세요.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Transient("503".into()).is_retryable());
        assert!(!Error::Rejected("401".into()).is_retryable());
        assert!(!Error::GenerationFailed("empty".into()).is_retryable());
        assert!(!Error::InvalidInput("topic".into()).is_retryable());
    }

    #[test]
    fn test_public_message_hides_internal_detail() {
        let err = Error::GenerationFailed("upstream said: {\"error\": \"quota for sk-123\"}".into());
        let message = err.public_message();
        assert!(!message.contains("sk-123"));
        assert_eq!(message, GENERIC_FAILURE);

        let err = Error::Timeout(std::time::Duration::from_secs(300));
        assert_eq!(err.public_message(), GENERIC_FAILURE);

        let err = Error::InvalidInput("주제는 2자 이상이어야 합니다".into());
        assert!(err.public_message().contains("2자 이상"));
    }
}
