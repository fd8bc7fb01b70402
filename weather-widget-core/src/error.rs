use thiserror::Error;

/// Failure of a single weather lookup.
///
/// Callers treat every variant the same way (log and keep the last good
/// record); the variants exist so logs say what actually went wrong.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("weather response contained no conditions")]
    NoConditions,

    #[error("weather fetch ended without a result")]
    Interrupted,
}

/// Failure of the device location lookup.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("location lookup failed: {0}")]
    Lookup(String),

    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
}
