// Error types shared by the low-level client and the lookup/cart helpers

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    // The service answered with an <Error> document (bad signature, throttling, ...)
    #[error("Service error ({status_code}): {code} - {message}")]
    ServiceError {
        status_code: u16,
        code: String,
        message: String,
    },

    // In-band errors reported under Request/Errors of an otherwise valid response
    #[error("Request error: {code} - {message}")]
    RequestError { code: String, message: String },

    #[error("XML parse error: {0}")]
    XmlParseError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CartError {
    #[error("cart has not been created yet")]
    NotCreated,

    #[error("response did not contain a CartId")]
    MissingCartId,
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}
