use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// JSON error body: `{ "message": "..." }`.
///
/// Some backends answer with `error` instead of `message`; both are accepted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(alias = "error")]
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_accepts_error_alias() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(body.message, "boom");
    }
}
