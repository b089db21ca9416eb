use thiserror::Error;

/// Everything a console operation can fail with.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// No credential in the session; the request was never sent.
    #[error("authentication token not found")]
    MissingCredential,
    #[error("API error ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("network error: {0}")]
    Transport(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("{0}")]
    Auth(String),
    #[error("a submission is already in progress")]
    Busy,
}

impl ConsoleError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ConsoleError::MissingCredential => 1001,
            ConsoleError::Http { .. } => 1002,
            ConsoleError::Transport(_) => 1003,
            ConsoleError::Validation(_) => 1004,
            ConsoleError::Decode(_) => 1101,
            ConsoleError::Storage(_) => 1102,
            ConsoleError::Auth(_) => 1200,
            ConsoleError::Busy => 1300,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ConsoleError::Decode(e.to_string())
        } else {
            ConsoleError::Transport(e.to_string())
        }
    }
}

impl From<models::ModelError> for ConsoleError {
    fn from(e: models::ModelError) -> Self {
        match e {
            models::ModelError::Validation(msg) => ConsoleError::Validation(msg),
            models::ModelError::MissingReference(msg) => ConsoleError::Validation(msg),
        }
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self { ConsoleError::Decode(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_carries_status_and_message() {
        let e = ConsoleError::Http { status: 404, message: "country not found".into() };
        assert_eq!(e.to_string(), "API error (404): country not found");
        assert_eq!(e.status(), Some(404));
    }

    #[test]
    fn model_validation_maps_to_validation() {
        let e: ConsoleError = models::ModelError::required("phone").into();
        assert_eq!(e, ConsoleError::Validation("phone is required".into()));
        assert_eq!(e.code(), 1004);
    }
}
