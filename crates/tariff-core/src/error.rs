use thiserror::Error;

#[derive(Debug, Error)]
pub enum TariffError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid tariff schedule: {0}")]
    InvalidSchedule(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for TariffError {
    fn from(e: serde_json::Error) -> Self {
        TariffError::SerializationError(e.to_string())
    }
}
