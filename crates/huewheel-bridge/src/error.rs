//! Error types for bridge discovery and the REST API client.
//!
//! Bridge errors distinguish the replies the controller reacts to (pairing
//! and authorization failures) from transport and parse failures it can only
//! report.

use crate::model::ApiError;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Unified error type for bridge discovery and API calls.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    // ============================================================
    // Replies the controller handles specially
    // ============================================================
    /// The stored username is not registered on the bridge.
    #[error("Unauthorized user")]
    Unauthorized,

    /// Pairing was attempted before the bridge's link button was pressed.
    #[error("Link button not pressed")]
    LinkButtonNotPressed,

    // ============================================================
    // Everything else
    // ============================================================
    /// An API error the client does not special-case.
    #[error("Bridge error {code}: {description}")]
    Api { code: u16, description: String },

    /// The bridge answered with a payload that does not fit the API shape.
    #[error("Unexpected bridge reply: {0}")]
    UnexpectedReply(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decoding failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ApiError> for BridgeError {
    fn from(e: ApiError) -> Self {
        match e.code {
            ApiError::UNAUTHORIZED_USER => BridgeError::Unauthorized,
            ApiError::LINK_BUTTON_NOT_PRESSED => BridgeError::LinkButtonNotPressed,
            _ => BridgeError::Api {
                code: e.code,
                description: e.description,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_api_errors_map_to_variants() {
        let unauthorized = ApiError {
            code: 1,
            address: "/".to_string(),
            description: "unauthorized user".to_string(),
        };
        assert!(matches!(
            BridgeError::from(unauthorized),
            BridgeError::Unauthorized
        ));

        let link_button = ApiError {
            code: 101,
            address: "/".to_string(),
            description: "link button not pressed".to_string(),
        };
        assert!(matches!(
            BridgeError::from(link_button),
            BridgeError::LinkButtonNotPressed
        ));
    }

    #[test]
    fn test_other_api_errors_keep_code_and_description() {
        let err = BridgeError::from(ApiError {
            code: 901,
            address: "/lights".to_string(),
            description: "internal error".to_string(),
        });
        assert!(err.to_string().contains("901"));
        assert!(err.to_string().contains("internal error"));
    }
}
