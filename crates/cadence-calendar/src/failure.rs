//! Credential failure detection.
//!
//! Every remote call goes through [`FailureHandler::guard`]. When a call fails
//! with one of the known "this credential is dead" messages, the stored token
//! is invalidated and operators are alerted. The error itself is always handed
//! back to the caller untouched, and the call is never retried.

use std::future::Future;
use std::sync::Arc;

use crate::error::CalendarError;

/// Error messages that mean the stored credential can no longer be used.
///
/// Matching is exact: these are Google's and the OAuth client's own texts, so
/// a wording change upstream silently turns detection off. There is no
/// pattern fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// Calendar API rejected the access token.
    InvalidCredentials,
    /// Token endpoint rejected the refresh token (revoked or expired).
    InvalidGrant,
    /// Nothing stored to authenticate with.
    NoCredentials,
    /// Access token expired and there is no refresh token.
    NoRefreshToken,
}

impl AuthFailure {
    pub const ALL: [AuthFailure; 4] = [
        AuthFailure::InvalidCredentials,
        AuthFailure::InvalidGrant,
        AuthFailure::NoCredentials,
        AuthFailure::NoRefreshToken,
    ];

    pub fn signature(self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "Invalid Credentials",
            AuthFailure::InvalidGrant => "invalid_grant",
            AuthFailure::NoCredentials => {
                "No access, refresh token, API key or refresh handler callback is set."
            }
            AuthFailure::NoRefreshToken => "No refresh token is set.",
        }
    }

    pub fn from_message(message: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|failure| failure.signature() == message)
    }
}

/// Marks the current credential unusable so the next call starts over.
pub trait TokenInvalidator: Send + Sync {
    fn invalidate(&self) -> anyhow::Result<()>;
}

/// Tells a human that calendar access is broken. Must not block.
pub trait OperatorNotifier: Send + Sync {
    fn token_invalid(&self, failure: AuthFailure);
}

#[derive(Clone)]
pub struct FailureHandler {
    invalidator: Arc<dyn TokenInvalidator>,
    notifier: Arc<dyn OperatorNotifier>,
}

impl FailureHandler {
    pub fn new(invalidator: Arc<dyn TokenInvalidator>, notifier: Arc<dyn OperatorNotifier>) -> Self {
        Self {
            invalidator,
            notifier,
        }
    }

    /// Run `call`, reacting to credential failures on the way out.
    pub async fn guard<T, Fut>(&self, call: Fut) -> Result<T, CalendarError>
    where
        Fut: Future<Output = Result<T, CalendarError>>,
    {
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                self.inspect(&err);
                Err(err)
            }
        }
    }

    /// Fire the invalidate + notify pair if `err` is a credential failure.
    pub fn inspect(&self, err: &CalendarError) -> Option<AuthFailure> {
        let failure = err.auth_failure()?;

        tracing::warn!(
            signature = failure.signature(),
            "Calendar credential rejected, invalidating stored token"
        );

        if let Err(e) = self.invalidator.invalidate() {
            tracing::error!("Failed to invalidate calendar token: {:#}", e);
        }
        self.notifier.token_invalid(failure);

        Some(failure)
    }
}
