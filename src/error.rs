use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures surfaced to the UI.
///
/// Cloneable so a failed call can be carried back inside a `Message`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Pre-flight check failed; no request was issued.
    #[error("{0}")]
    Validation(String),

    /// Non-2xx response (`status` set) or transport/decoding failure.
    ///
    /// `detail` is the server's own explanation, when the body carried one.
    #[error("{message}")]
    Request {
        status: Option<u16>,
        message: String,
        detail: Option<String>,
    },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// A request failure without a server-provided detail.
    pub fn request(status: Option<u16>, message: impl Into<String>) -> Self {
        ClientError::Request { status, message: message.into(), detail: None }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => *status,
            ClientError::Validation(_) => None,
        }
    }

    #[cfg(test)]
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation(_))
    }

    /// The failure's message, or `fallback` when it carries none.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            ClientError::Validation(message) => message,
            ClientError::Request { message, .. } => message,
        };
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message.clone()
        }
    }

    /// The server's detail (or a validation message), else `fallback`.
    ///
    /// Generic transport and status messages are replaced by `fallback`.
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            ClientError::Validation(message) => message.clone(),
            ClientError::Request { detail: Some(detail), .. } => detail.clone(),
            ClientError::Request { detail: None, .. } => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::request(e.status().map(|s| s.as_u16()), e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_falls_back_when_empty() {
        let err = ClientError::request(Some(502), "");
        assert_eq!(err.user_message("Search failed"), "Search failed");

        let err = ClientError::request(Some(500), "index offline");
        assert_eq!(err.user_message("Search failed"), "index offline");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_detail_or_ignores_generic_messages() {
        let fallback = "Upload failed. Please try again.";
        let err = ClientError::request(Some(500), "Request failed with status code 500");
        assert_eq!(err.detail_or(fallback), fallback);

        let err = ClientError::Request {
            status: Some(415),
            message: "Unsupported file type".into(),
            detail: Some("Unsupported file type".into()),
        };
        assert_eq!(err.detail_or(fallback), "Unsupported file type");
    }

    #[test]
    fn test_validation_has_no_status() {
        let err = ClientError::validation("File too large. Maximum size is 10MB");
        assert!(err.is_validation());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "File too large. Maximum size is 10MB");
        assert_eq!(err.detail_or("fallback"), "File too large. Maximum size is 10MB");
    }
}
