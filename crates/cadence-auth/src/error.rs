//! Token acquisition errors.

use thiserror::Error;

/// Errors raised while obtaining or refreshing an access token.
///
/// The display text of the first three variants is what callers see as the
/// error message, and the calendar layer recognizes several of them as
/// "credential is dead" signals. Keep them stable.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No access, refresh token, API key or refresh handler callback is set.")]
    NoCredentials,

    #[error("No refresh token is set.")]
    NoRefreshToken,

    /// The token endpoint rejected the request; `code` is the OAuth error
    /// code such as `invalid_grant`.
    #[error("{code}")]
    Rejected {
        code: String,
        description: Option<String>,
    },

    #[error("Google OAuth client is not configured")]
    NotConfigured,

    #[error("Token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected token response: {0}")]
    InvalidResponse(String),

    #[error("Token storage error: {0}")]
    Storage(String),
}

impl AuthError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoCredentials | Self::NoRefreshToken => {
                "Calendar access is not set up. Please authorize again."
            }
            Self::Rejected { .. } => "Calendar access was revoked. Please authorize again.",
            Self::NotConfigured => "Google sign-in is not configured. Check your settings.",
            Self::Request(_) => "Network error. Check your connection.",
            Self::InvalidResponse(_) => "Sign-in failed. Please try again.",
            Self::Storage(_) => "Failed to read or save credentials.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_displays_only_the_code() {
        let err = AuthError::Rejected {
            code: "invalid_grant".into(),
            description: Some("Token has been expired or revoked.".into()),
        };
        assert_eq!(err.to_string(), "invalid_grant");
    }

    #[test]
    fn test_missing_token_messages() {
        assert_eq!(
            AuthError::NoCredentials.to_string(),
            "No access, refresh token, API key or refresh handler callback is set."
        );
        assert_eq!(AuthError::NoRefreshToken.to_string(), "No refresh token is set.");
    }

    #[test]
    fn test_user_messages() {
        assert!(AuthError::NoRefreshToken.user_message().contains("authorize"));
        assert!(AuthError::NotConfigured.user_message().contains("settings"));
    }
}
