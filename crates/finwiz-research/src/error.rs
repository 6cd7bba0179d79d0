//! Error types for market data and research operations

use thiserror::Error;

/// Research specific errors
#[derive(Debug, Error)]
pub enum ResearchError {
    /// Upstream API answered with an error
    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// A required API key is not configured
    #[error("{0} environment variable not set")]
    MissingApiKey(&'static str),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinance(String),

    /// Invalid tool or client input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResearchError {
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for research operations
pub type Result<T> = std::result::Result<T, ResearchError>;

impl From<ResearchError> for finwiz_core::Error {
    fn from(err: ResearchError) -> Self {
        match err {
            ResearchError::Config(msg) => finwiz_core::Error::Configuration(msg),
            other => finwiz_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResearchError::MissingApiKey("ALPHA_VANTAGE_API_KEY");
        assert_eq!(
            err.to_string(),
            "ALPHA_VANTAGE_API_KEY environment variable not set"
        );

        let err = ResearchError::api("CoinMarketCap", "401 - unauthorized");
        assert_eq!(err.to_string(), "CoinMarketCap API error: 401 - unauthorized");
    }

    #[test]
    fn test_error_conversion() {
        let agent_err: finwiz_core::Error = ResearchError::Config("bad url".to_string()).into();
        assert!(matches!(agent_err, finwiz_core::Error::Configuration(_)));

        let agent_err: finwiz_core::Error = ResearchError::DataUnavailable {
            symbol: "XYZ".to_string(),
            reason: "delisted".to_string(),
        }
        .into();
        match agent_err {
            finwiz_core::Error::ProcessingFailed(msg) => assert!(msg.contains("XYZ")),
            other => panic!("Expected ProcessingFailed, got {other:?}"),
        }
    }
}
