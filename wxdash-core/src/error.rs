use std::path::PathBuf;

use reqwest::StatusCode;

/// Failures surfaced by a [`crate::WeatherProvider`].
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    /// The service does not recognise the city. Usually a typo on the user's side.
    #[error("City '{city}' not found.")]
    NotFound { city: String },

    #[error("Weather service error: {status} - {}", truncate_body(.body))]
    Service { status: StatusCode, body: String },

    #[error("Network error while contacting the weather service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected weather service payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures on the history file or an export of it. All are fatal to the
/// operation in progress.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("I/O error on history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to export over the history file {}", .path.display())]
    ExportOverHistory { path: PathBuf },

    #[error("Failed to serialize history record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
