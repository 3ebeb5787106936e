//! Error types for the wallet client.

/// Failures talking to the backend, as seen through the ports.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Malformed balance payload: {0}")]
    MalformedBalance(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl ApiError {
    /// Message written by the server, if the failure came from one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Api { message, .. } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Errors the wallet surfaces to its caller.
///
/// Backend failures are not in here: the wallet logs them and reports
/// `false`/zero instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("Amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance { available: f64, requested: f64 },

    #[error("Validation error: {0}")]
    Validation(String),
}
