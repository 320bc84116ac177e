use async_trait::async_trait;
use shared::{
    domain::{Booking, Event, EventId},
    protocol::CreateEventVariables,
};

pub mod catalog;
pub mod controller;
pub mod error;
pub mod graphql;

pub use catalog::EventCatalog;
pub use controller::{
    EventForm, EventsView, FormField, LoadState, Modal, UnknownFormField, WorkflowController,
};
pub use error::{ApiError, ControllerError, UiError, UiErrorCategory, UiErrorContext};
pub use graphql::GraphqlClient;

/// Remote operations the controller depends on. Implementations attach the
/// bearer token they are given and do nothing else: no retries, no caching.
#[async_trait]
pub trait EventsApi: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;
    /// The returned event carries no creator; the server does not echo it.
    async fn create_event(
        &self,
        token: &str,
        input: &CreateEventVariables,
    ) -> Result<Event, ApiError>;
    async fn book_event(&self, token: &str, event_id: &EventId) -> Result<Booking, ApiError>;
}
