//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors raised while turning a webhook body into a typed event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("Payload has no repository")]
    MissingRepository,

    #[error("Invalid {event} payload: {source}")]
    InvalidPayload {
        event: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors returned by the Discord delivery call.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Request to Discord failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Discord responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid webhook endpoint '{url}': {message}")]
    InvalidEndpoint { url: String, message: String },
}

/// Errors raised while relaying a single event.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Delivery to thread {thread} failed: {source}")]
    Delivery {
        thread: String,
        #[source]
        source: DeliveryError,
    },
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for Discord delivery.
pub type DeliveryResult<T> = std::result::Result<T, DeliveryError>;
