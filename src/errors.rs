use thiserror::Error;

/// Gigz Errors.
#[derive(Debug, Error)]
pub enum GigzError {
    /// The API base URL is not a valid absolute URL.
    #[error("Invalid API base URL.")]
    InvalidBaseUrl,

    /// The API rejected the login attempt.
    /// Deliberately carries no detail about whether the email exists.
    #[error("Invalid email or password. Please try again.")]
    InvalidCredentials,
    /// The refresh token was rejected or could not be redeemed.
    /// The session has been torn down and the user must log in again.
    #[error("Your session has expired. Please log in again.")]
    SessionExpired,
    /// The API returned a 401: Unauthorized status code, and the single silent refresh did not help.
    #[error("Unauthorized.")]
    Unauthorized,

    /// The access token payload could not be read.
    #[error("Invalid access token.")]
    InvalidToken,

    /// Failed to send a request to the Gigz API. No response was received.
    #[error("Failed to reach the Gigz API.")]
    NetworkError,
    /// The Gigz API returned a 5xx status code.
    /// This is also the catch-all for unusual status codes.
    #[error("Server error ({status}).")]
    ServerError { status: u16 },
    /// The Gigz API returned a 4xx status code with a field-level message,
    /// or a payload failed validation before it was sent.
    #[error("Validation failed: {0}")]
    ValidationError(String),
    /// The Gigz API returned a 404: Not Found status code.
    /// The resource no longer exists server-side.
    #[error("Resource not found.")]
    NotFound,

    /// Failed to decode a Gigz API response.
    #[error("Failed to decode Gigz API response.")]
    FailedToDecode,

    /// Failed to encode a request body as JSON.
    #[error("Failed to encode Gigz API request.")]
    FailedToEncode,

    /// Reading or writing the persisted refresh token failed.
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl GigzError {
    /// Maps a non-success HTTP status to an error. `body` is searched for a `message` or `error` field.
    pub fn from_status(status: u16, body: &serde_json::Value) -> Self {
        match status {
            401 => GigzError::Unauthorized,
            404 => GigzError::NotFound,
            400..=499 => {
                let message = body
                    .get("message")
                    .or_else(|| body.get("error"))
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("request rejected with status {}", status));
                GigzError::ValidationError(message)
            }
            _ => GigzError::ServerError { status },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_auth_and_missing_statuses() {
        assert!(matches!(
            GigzError::from_status(401, &json!(null)),
            GigzError::Unauthorized
        ));
        assert!(matches!(
            GigzError::from_status(404, &json!({"message": "gone"})),
            GigzError::NotFound
        ));
    }

    #[test]
    fn client_errors_carry_server_message() {
        let err = GigzError::from_status(422, &json!({"message": "price must be positive"}));
        match err {
            GigzError::ValidationError(msg) => assert_eq!(msg, "price must be positive"),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = GigzError::from_status(400, &json!({"error": "name is required"}));
        assert_eq!(err.to_string(), "Validation failed: name is required");
    }

    #[test]
    fn client_errors_without_message_mention_status() {
        let err = GigzError::from_status(409, &json!("conflict"));
        assert_eq!(
            err.to_string(),
            "Validation failed: request rejected with status 409"
        );
    }

    #[test]
    fn unusual_statuses_are_server_errors() {
        assert!(matches!(
            GigzError::from_status(503, &json!(null)),
            GigzError::ServerError { status: 503 }
        ));
        assert!(matches!(
            GigzError::from_status(302, &json!(null)),
            GigzError::ServerError { status: 302 }
        ));
    }
}
