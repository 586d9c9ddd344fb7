use serde::Deserialize;
use thiserror::Error;

// Esri services report failures inside a 200 body with this shape
#[derive(Deserialize, Debug)]
pub struct EsriErrorDetail {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}
#[derive(Deserialize, Debug)]
pub struct EsriErrorPayload {
    pub error: EsriErrorDetail,
}

// Mapbox returns `{"message": "..."}` alongside 4xx statuses
#[derive(Deserialize, Debug)]
pub struct MapboxErrorPayload {
    pub message: String,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Underlying request failed: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // Structured error reported by the provider
    #[error("API Error (Code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Shape(String),

    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Client state lock was poisoned")]
    StatePoisoned,
}

impl FetchError {
    /// Whether retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Timeout => true,
            FetchError::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Builds an `HttpStatus` error, preferring the provider's message over the raw body.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        let body = match serde_json::from_slice::<MapboxErrorPayload>(body) {
            Ok(payload) => payload.message,
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };
        FetchError::HttpStatus { status, body }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}
