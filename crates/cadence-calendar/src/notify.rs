//! Operator alerts for dead calendar credentials.

use std::sync::Arc;

use cadence_core::{Config, Environment};

use crate::failure::{AuthFailure, OperatorNotifier};

/// Alerts through the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl OperatorNotifier for LogNotifier {
    fn token_invalid(&self, failure: AuthFailure) {
        tracing::error!(
            signature = failure.signature(),
            "Calendar token is invalid, re-authorization required"
        );
    }
}

/// Posts a JSON `{"text": ...}` message to a webhook.
///
/// Delivery runs on a spawned task so the failing call returns immediately;
/// delivery problems are logged and otherwise ignored.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
    environment: Environment,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, environment: Environment) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            environment,
        }
    }

    fn message(&self, failure: AuthFailure) -> String {
        format!(
            "[{}] Google Calendar token is invalid ({}). Calendar updates will fail until access is re-authorized.",
            self.environment,
            failure.signature()
        )
    }
}

impl OperatorNotifier for WebhookNotifier {
    fn token_invalid(&self, failure: AuthFailure) {
        LogNotifier.token_invalid(failure);

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, skipping webhook notification");
            return;
        };

        let request = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": self.message(failure) }));

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::debug!("Token failure notification delivered");
                }
                Ok(response) => {
                    tracing::warn!(status = %response.status(), "Webhook rejected notification");
                }
                Err(e) => {
                    tracing::warn!("Failed to deliver webhook notification: {}", e);
                }
            }
        });
    }
}

/// Webhook notifier when one is configured, log notifier otherwise.
pub fn notifier_from_config(config: &Config) -> Arc<dyn OperatorNotifier> {
    match &config.notifications.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), config.environment)),
        None => Arc::new(LogNotifier),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_webhook_posts_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_string_contains("invalid_grant"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hook", server.uri()), Environment::Production);
        notifier.token_invalid(AuthFailure::InvalidGrant);

        for _ in 0..50 {
            if !server.received_requests().await.unwrap_or_default().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let text = body["text"].as_str().unwrap();
        assert!(text.starts_with("[production]"));
    }

    #[test]
    fn test_webhook_without_runtime_does_not_panic() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", Environment::Test);
        notifier.token_invalid(AuthFailure::NoRefreshToken);
    }

    #[test]
    fn test_message_names_environment_and_signature() {
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/hook", Environment::Test);
        let message = notifier.message(AuthFailure::InvalidCredentials);
        assert!(message.contains("[test]"));
        assert!(message.contains("Invalid Credentials"));
    }

    #[test]
    fn test_notifier_from_config() {
        let mut config = Config::default();
        // LogNotifier path; nothing observable beyond not panicking
        notifier_from_config(&config).token_invalid(AuthFailure::NoCredentials);

        config.notifications.webhook_url = Some("http://127.0.0.1:9/hook".to_string());
        notifier_from_config(&config).token_invalid(AuthFailure::NoCredentials);
    }
}
