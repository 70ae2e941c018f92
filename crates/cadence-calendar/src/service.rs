//! Public calendar operations.
//!
//! Every operation acquires a token and makes its remote call(s) inside the
//! failure guard, so a dead credential is reported no matter which operation
//! hit it first.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use cadence_auth::{GoogleOAuth2Provider, TokenStore};
use cadence_core::{Config, Environment};

use crate::attendees::{
    add_to_attendees, attendee_update_body, cancel_attendance, remove_from_attendees,
};
use crate::client::CalendarClient;
use crate::credentials::{CredentialProvider, StoredCredentials};
use crate::error::CalendarError;
use crate::failure::FailureHandler;
use crate::notify::notifier_from_config;
use crate::request::build_event_body;
use crate::types::{
    Attendee, Calendar, CreatedEvent, EventBody, EventDraft, EventIdentity, EventSnapshot,
    NewCalendar,
};

pub struct CalendarService<C> {
    client: CalendarClient,
    credentials: Arc<C>,
    failures: FailureHandler,
    environment: Environment,
}

impl CalendarService<StoredCredentials> {
    /// Wire the service from configuration: file token store, optional OAuth
    /// refresh, and the configured operator notifier.
    pub fn from_config(config: &Config) -> Self {
        let oauth = config
            .google
            .credentials()
            .map(|(id, secret)| GoogleOAuth2Provider::new(id, secret));
        let credentials = Arc::new(StoredCredentials::new(
            TokenStore::new(config.token_dir()),
            oauth,
        ));
        let failures = FailureHandler::new(credentials.clone(), notifier_from_config(config));

        Self::new(
            CalendarClient::with_base_url(&config.google.api_base_url),
            credentials,
            failures,
            config.environment,
        )
    }
}

impl<C: CredentialProvider> CalendarService<C> {
    pub fn new(
        client: CalendarClient,
        credentials: Arc<C>,
        failures: FailureHandler,
        environment: Environment,
    ) -> Self {
        Self {
            client,
            credentials,
            failures,
            environment,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Acquire a token and run `call` with it, all under the failure guard.
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T, CalendarError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, CalendarError>>,
    {
        self.failures
            .guard(async {
                let token = self.credentials.access_token().await?;
                call(token).await
            })
            .await
    }

    /// Create a secondary calendar.
    #[instrument(skip(self), level = "info")]
    pub async fn create_calendar(
        &self,
        summary: &str,
        description: &str,
    ) -> Result<Calendar, CalendarError> {
        let calendar = NewCalendar {
            summary: summary.to_string(),
            description: description.to_string(),
        };
        self.authorized(|token| async move {
            self.client.insert_calendar(&token, &calendar).await
        })
        .await
    }

    /// Create an event from `draft`, inviting its attendees if the
    /// environment allows it.
    #[instrument(skip(self, draft), level = "info")]
    pub async fn create_calendar_event(
        &self,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<CreatedEvent, CalendarError> {
        let body = build_event_body(draft, None, self.environment);
        let created = self
            .authorized(|token| async move {
                self.client.insert_event(&token, calendar_id, &body).await
            })
            .await?;

        let calendar_event_id = created
            .id()
            .ok_or_else(|| CalendarError::InvalidResponse("created event has no id".into()))?
            .to_string();

        tracing::info!(%calendar_event_id, "Created calendar event");
        Ok(CreatedEvent { calendar_event_id })
    }

    /// Fetch an event as stored remotely.
    #[instrument(skip(self), level = "info")]
    pub async fn get_calendar_event(
        &self,
        identity: &EventIdentity,
    ) -> Result<EventSnapshot, CalendarError> {
        self.authorized(|token| async move {
            self.client
                .get_event(&token, &identity.calendar_id, &identity.calendar_event_id)
                .await
        })
        .await
    }

    /// Read the event, derive a new body from it with `updater`, write it back.
    ///
    /// Not atomic: nothing stops another writer between the read and the
    /// write, and the later write wins. A failed read means no write happens.
    #[instrument(skip(self, updater), level = "info")]
    pub async fn get_and_update_event<F>(
        &self,
        identity: &EventIdentity,
        updater: F,
    ) -> Result<EventSnapshot, CalendarError>
    where
        F: FnOnce(&EventSnapshot) -> Result<EventBody, CalendarError>,
    {
        let current = self.get_calendar_event(identity).await?;
        let body = updater(&current)?;

        self.authorized(|token| async move {
            self.client
                .update_event(
                    &token,
                    &identity.calendar_id,
                    &identity.calendar_event_id,
                    &body,
                )
                .await
        })
        .await
    }

    /// Change time, title or status. Attendees in `draft` are ignored.
    #[instrument(skip(self, draft), level = "info")]
    pub async fn update_calendar_event_details(
        &self,
        identity: &EventIdentity,
        draft: &EventDraft,
    ) -> Result<(), CalendarError> {
        let draft = EventDraft {
            attendees: None,
            ..draft.clone()
        };
        let environment = self.environment;

        self.get_and_update_event(identity, |event| {
            Ok(build_event_body(&draft, Some(event), environment))
        })
        .await?;
        Ok(())
    }

    /// Mark the event cancelled (attendees are told) without deleting it.
    #[instrument(skip(self), level = "info")]
    pub async fn cancel_calendar_event(
        &self,
        identity: &EventIdentity,
    ) -> Result<(), CalendarError> {
        self.update_calendar_event_details(identity, &EventDraft::new().cancelled())
            .await
    }

    /// Apply `transform` to the attendee list of a future event.
    ///
    /// Events that have already started keep their stored list.
    #[instrument(skip(self, transform), level = "info")]
    pub async fn update_attendees_on_event<F>(
        &self,
        identity: &EventIdentity,
        transform: F,
    ) -> Result<EventSnapshot, CalendarError>
    where
        F: FnOnce(Vec<Attendee>) -> Vec<Attendee>,
    {
        let environment = self.environment;
        self.get_and_update_event(identity, |event| {
            attendee_update_body(event, transform, environment, Utc::now())
        })
        .await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn add_event_attendee(
        &self,
        identity: &EventIdentity,
        email: &str,
    ) -> Result<EventSnapshot, CalendarError> {
        self.update_attendees_on_event(identity, add_to_attendees(email))
            .await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn remove_event_attendee(
        &self,
        identity: &EventIdentity,
        email: &str,
    ) -> Result<EventSnapshot, CalendarError> {
        self.update_attendees_on_event(identity, remove_from_attendees(email))
            .await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn cancel_event_attendance(
        &self,
        identity: &EventIdentity,
        email: &str,
    ) -> Result<EventSnapshot, CalendarError> {
        self.update_attendees_on_event(identity, cancel_attendance(email))
            .await
    }

    #[instrument(skip(self), level = "info")]
    pub async fn delete_calendar_event(&self, identity: &EventIdentity) -> Result<(), CalendarError> {
        self.authorized(|token| async move {
            self.client
                .delete_event(&token, &identity.calendar_id, &identity.calendar_event_id)
                .await
        })
        .await
    }
}
