//! Calendar-specific error types.

use cadence_auth::AuthError;
use cadence_core::ReqwestErrorExt;
use thiserror::Error;

use crate::failure::AuthFailure;

#[derive(Error, Debug)]
pub enum CalendarError {
    /// Non-2xx response from the Calendar API. `message` is the service's own
    /// `error.message` text.
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Obtaining an access token failed.
    #[error(transparent)]
    Credentials(#[from] AuthError),

    #[error("Invalid event data: {0}")]
    InvalidEventData(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

impl CalendarError {
    /// The bare message carried by the error, as reported by whichever
    /// service produced it.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Credentials(e) => e.to_string(),
            Self::InvalidEventData(msg) | Self::InvalidResponse(msg) => msg.clone(),
            Self::NetworkError(e) => e.to_string(),
        }
    }

    /// The credential failure this error signals, if any.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        AuthFailure::from_message(&self.message())
    }

    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        if self.auth_failure().is_some() {
            return "Calendar access has expired. Please authorize again.".to_string();
        }
        match self {
            Self::Api { status: 404, .. } => "Event or calendar not found".to_string(),
            Self::Api { status: 429, .. } => {
                "Too many calendar requests. Please wait a moment.".to_string()
            }
            Self::Api { message, .. } => format!("Calendar error: {}", message),
            Self::Credentials(e) => e.user_message().to_string(),
            Self::InvalidEventData(msg) => format!("Invalid event: {}", msg),
            Self::InvalidResponse(_) => "Unexpected response from the calendar".to_string(),
            Self::NetworkError(e) => e.to_network_error().user_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_message_is_raw_service_text() {
        let err = CalendarError::Api {
            status: 401,
            message: "Invalid Credentials".into(),
        };
        assert_eq!(err.message(), "Invalid Credentials");
        assert_eq!(err.to_string(), "Calendar API error (401): Invalid Credentials");
        assert_eq!(err.auth_failure(), Some(AuthFailure::InvalidCredentials));
    }

    #[test]
    fn test_credential_errors_carry_auth_message() {
        let err = CalendarError::from(AuthError::Rejected {
            code: "invalid_grant".into(),
            description: None,
        });
        assert_eq!(err.message(), "invalid_grant");
        assert_eq!(err.auth_failure(), Some(AuthFailure::InvalidGrant));

        let err = CalendarError::from(AuthError::NotConfigured);
        assert_eq!(err.auth_failure(), None);
    }

    #[test]
    fn test_not_found() {
        let err = CalendarError::Api {
            status: 404,
            message: "Not Found".into(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.auth_failure(), None);
        assert_eq!(err.user_message(), "Event or calendar not found");
    }

    #[test]
    fn test_user_messages() {
        let err = CalendarError::from(AuthError::NoRefreshToken);
        assert!(err.user_message().contains("authorize"));

        let err = CalendarError::Api {
            status: 429,
            message: "Rate Limit Exceeded".into(),
        };
        assert!(err.user_message().contains("wait"));

        let err = CalendarError::InvalidEventData("bad attendees".into());
        assert!(err.user_message().contains("bad attendees"));
    }
}
