//! Client error types

use cafe_core::FieldErrors;
use serde_json::Value;
use thiserror::Error;

/// Everything a client call can fail with
#[derive(Debug, Error)]
pub enum ClientError {
    /// The form did not pass local validation; nothing was sent
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The server answered with a non-2xx status
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status code
        status: u16,
        /// Server `error` message, or the status reason
        message: String,
        /// Server `details`, if any
        details: Option<Value>,
    },

    /// The request never got an answer
    #[error("network error: {0}")]
    Network(String),

    /// The answer could not be decoded
    #[error("invalid response: {0}")]
    Decode(String),

    /// The request body could not be built
    #[error("invalid request: {0}")]
    Encode(String),

    /// An admin call was attempted without a stored token
    #[error("not logged in")]
    Unauthenticated,

    /// The local store could not be read or written
    #[error("storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// True for pre-submit validation failures
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for transport and HTTP failures
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { .. } | Self::Decode(_))
    }

    /// HTTP status of a server rejection
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Titles listed in a category-in-use rejection
    #[must_use]
    pub fn conflict_items(&self) -> Vec<String> {
        let Self::Http {
            details: Some(details),
            ..
        } = self
        else {
            return Vec::new();
        };
        details
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_conflict_items() {
        let err = ClientError::Http {
            status: 409,
            message: "Category \"Напитки\" is used by menu items".to_string(),
            details: Some(json!({ "items": ["Americano", "Latte"] })),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.conflict_items(), vec!["Americano", "Latte"]);
        assert!(err.is_network());

        assert!(ClientError::Unauthenticated.conflict_items().is_empty());
    }

    #[test]
    fn test_classification() {
        let mut fields = FieldErrors::default();
        fields.insert("price", "Price must be greater than 0");
        let err = ClientError::from(fields);
        assert!(err.is_validation());
        assert!(!err.is_network());
        assert_eq!(
            err.to_string(),
            "validation failed: price: Price must be greater than 0"
        );
    }
}
