use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use payment_engine::PaymentFlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Payment notification signature is invalid")]
    InvalidSignature,
    #[error("Malformed payment notification. {0}")]
    MalformedNotification(String),
    #[error("Payment notification refers to unknown order {0}")]
    UnknownPayment(i64),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("The payment gateway could not be reached. {0}")]
    GatewayUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::MalformedNotification(_) => StatusCode::BAD_REQUEST,
            Self::UnknownPayment(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<PaymentFlowError> for ServerError {
    fn from(e: PaymentFlowError) -> Self {
        match e {
            PaymentFlowError::Configuration(s) => Self::ConfigurationError(s),
            PaymentFlowError::SignatureInvalid => Self::InvalidSignature,
            PaymentFlowError::MalformedPayload(s) => Self::MalformedNotification(s),
            PaymentFlowError::PaymentNotFound(id) => Self::UnknownPayment(id),
            PaymentFlowError::Upstream(e) => Self::GatewayUnavailable(e.to_string()),
            PaymentFlowError::Storage(e) => Self::BackendError(e.to_string()),
        }
    }
}
