use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PayHereApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("PayHere is not configured correctly. {0}")]
    Configuration(String),
    #[error("PayHere rejected our credentials. Error {status}. {message}")]
    UpstreamAuth { status: u16, message: String },
    #[error("PayHere is unreachable. {0}")]
    UpstreamUnavailable(String),
    #[error("PayHere returned an unexpected response. {0}")]
    ServerError(String),
}

impl PayHereApiError {
    /// Whether a later attempt could succeed without anyone changing the configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamAuth { .. } | Self::UpstreamUnavailable(_) | Self::ServerError(_))
    }
}
