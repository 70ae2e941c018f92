//! Google Calendar API client.
//!
//! Thin HTTP layer: one method per API call, no retries, no state beyond the
//! connection pool. Event writes always ask Google to email every participant
//! (`sendUpdates=all`).

use serde::de::DeserializeOwned;
use tracing::instrument;

use cadence_core::config::DEFAULT_CALENDAR_API_BASE;

use crate::error::CalendarError;
use crate::types::{ApiErrorResponse, Calendar, EventBody, EventSnapshot, NewCalendar};

const SEND_UPDATES: &str = "sendUpdates=all";

#[derive(Clone)]
pub struct CalendarClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for CalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_CALENDAR_API_BASE)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn events_url(&self, calendar_id: &str) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(calendar_id)
        )
    }

    fn event_url(&self, calendar_id: &str, event_id: &str) -> String {
        format!(
            "{}/{}",
            self.events_url(calendar_id),
            urlencoding::encode(event_id)
        )
    }

    /// Create a secondary calendar.
    #[instrument(skip(self, access_token, calendar), level = "info")]
    pub async fn insert_calendar(
        &self,
        access_token: &str,
        calendar: &NewCalendar,
    ) -> Result<Calendar, CalendarError> {
        let url = format!("{}/calendars", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(calendar)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a single event.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn get_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<EventSnapshot, CalendarError> {
        let response = self
            .client
            .get(self.event_url(calendar_id, event_id))
            .bearer_auth(access_token)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Create an event.
    #[instrument(skip(self, access_token, body), level = "info")]
    pub async fn insert_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        body: &EventBody,
    ) -> Result<EventSnapshot, CalendarError> {
        let url = format!("{}?{}", self.events_url(calendar_id), SEND_UPDATES);

        let response = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Replace an event with `body`.
    #[instrument(skip(self, access_token, body), level = "info")]
    pub async fn update_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
        body: &EventBody,
    ) -> Result<EventSnapshot, CalendarError> {
        let url = format!("{}?{}", self.event_url(calendar_id, event_id), SEND_UPDATES);

        let response = self
            .client
            .put(&url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Delete an event.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn delete_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let url = format!("{}?{}", self.event_url(calendar_id, event_id), SEND_UPDATES);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        // Delete returns 204 No Content on success
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::api_error(response).await)
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::InvalidResponse(format!("JSON parse error: {}", e)))
        } else {
            Err(Self::api_error(response).await)
        }
    }

    /// Turn a failed response into an error carrying Google's own message,
    /// falling back to the HTTP reason phrase.
    async fn api_error(response: reqwest::Response) -> CalendarError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ApiErrorResponse>(&text)
            .ok()
            .map(|body| body.error.message)
            .filter(|message| !message.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or(text);

        tracing::debug!(status = status.as_u16(), %message, "Calendar API request failed");

        CalendarError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
