//! reqwest-backed `EventsApi` speaking `{query, variables}` JSON to one endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{
    domain::{Booking, Event, EventId},
    protocol::{
        BookEventData, BookEventVariables, CreateEventData, CreateEventVariables, EventsData,
        GraphqlRequest, GraphqlResponse, BOOK_EVENT_MUTATION, CREATE_EVENT_MUTATION,
        LIST_EVENTS_QUERY,
    },
};
use tracing::debug;
use url::Url;

use crate::{error::ApiError, EventsApi};

#[derive(Clone)]
pub struct GraphqlClient {
    http: Client,
    endpoint: Url,
}

impl GraphqlClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }

    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute<V, R>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Option<V>,
        token: Option<&str>,
    ) -> Result<R, ApiError>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(self.endpoint.clone())
            .json(&GraphqlRequest { query, variables });
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(
            operation,
            status = status.as_u16(),
            bytes = body.len(),
            "graphql: response received"
        );

        // Errors are checked before the typed decode: servers commonly pair
        // them with `data: {"createEvent": null}`.
        let envelope = match serde_json::from_slice::<GraphqlResponse<Value>>(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                });
            }
            Err(err) => return Err(ApiError::Decode(err)),
        };

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(ApiError::Server(errors));
        }
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        let data = envelope.data.ok_or(ApiError::MissingData)?;
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl EventsApi for GraphqlClient {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let data: EventsData = self
            .execute::<(), _>("list_events", LIST_EVENTS_QUERY, None, None)
            .await?;
        Ok(data.events.into_iter().map(Event::from).collect())
    }

    async fn create_event(
        &self,
        token: &str,
        input: &CreateEventVariables,
    ) -> Result<Event, ApiError> {
        let data: CreateEventData = self
            .execute(
                "create_event",
                CREATE_EVENT_MUTATION,
                Some(input),
                Some(token),
            )
            .await?;
        Ok(Event::from(data.create_event))
    }

    async fn book_event(&self, token: &str, event_id: &EventId) -> Result<Booking, ApiError> {
        let data: BookEventData = self
            .execute(
                "book_event",
                BOOK_EVENT_MUTATION,
                Some(BookEventVariables {
                    id: event_id.clone(),
                }),
                Some(token),
            )
            .await?;
        Ok(Booking::from(data.book_event))
    }
}

#[cfg(test)]
#[path = "tests/graphql_tests.rs"]
mod tests;
