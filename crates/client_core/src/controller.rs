//! Workflow controller: catalog loading, create/detail modals, and booking.
//!
//! State sits behind an async mutex that is only held for synchronous
//! sections. Remote calls run with the lock released, so intents keep
//! flowing while a request is in flight and the response is merged when it
//! completes.

use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use shared::{
    domain::{Booking, Event, EventId, Session},
    protocol::CreateEventVariables,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    catalog::EventCatalog,
    error::{ControllerError, UiError, UiErrorContext},
    EventsApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal<T> {
    Closed,
    Open(T),
}

impl<T> Default for Modal<T> {
    fn default() -> Self {
        Self::Closed
    }
}

impl<T> Modal<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            Self::Open(payload) => Some(payload),
            Self::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Price,
    Date,
    Description,
}

#[derive(Debug, Error)]
#[error("unknown form field `{0}`")]
pub struct UnknownFormField(pub String);

impl FromStr for FormField {
    type Err = UnknownFormField;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "title" => Ok(Self::Title),
            "price" => Ok(Self::Price),
            "date" => Ok(Self::Date),
            "description" => Ok(Self::Description),
            other => Err(UnknownFormField(other.to_string())),
        }
    }
}

/// Raw text of the create form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub price: String,
    pub date: String,
    pub description: String,
}

impl EventForm {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Price => &self.price,
            FormField::Date => &self.date,
            FormField::Description => &self.description,
        }
    }

    fn set(&mut self, field: FormField, value: String) {
        let slot = match field {
            FormField::Title => &mut self.title,
            FormField::Price => &mut self.price,
            FormField::Date => &mut self.date,
            FormField::Description => &mut self.description,
        };
        *slot = value;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// `None` for empty, unparsable or non-finite input.
    pub fn coerced_price(&self) -> Option<f64> {
        self.price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|price| price.is_finite())
    }

    pub fn to_variables(&self) -> CreateEventVariables {
        CreateEventVariables {
            title: self.title.clone(),
            desc: self.description.clone(),
            price: self.coerced_price(),
            date: self.date.clone(),
        }
    }
}

/// Render inputs handed to views. Always a copy; views never hold live state.
#[derive(Debug, Clone, PartialEq)]
pub struct EventsView {
    pub load_state: LoadState,
    pub is_loading: bool,
    pub events: Vec<Event>,
    pub creating: bool,
    pub selected_event: Option<Event>,
    pub form: EventForm,
    pub last_error: Option<UiError>,
    pub can_create: bool,
    pub can_book: bool,
}

#[derive(Default)]
struct ControllerState {
    load_state: LoadState,
    loads_issued: u64,
    catalog: EventCatalog,
    create_modal: Modal<()>,
    detail_modal: Modal<EventId>,
    form: EventForm,
    last_error: Option<UiError>,
}

impl ControllerState {
    fn close_modals(&mut self) {
        self.create_modal = Modal::Closed;
        self.detail_modal = Modal::Closed;
        self.form.clear();
    }

    fn record_failure(&mut self, context: UiErrorContext, err: ControllerError) -> ControllerError {
        warn!(?context, "events: {err}");
        self.last_error = Some(UiError::from_error(context, &err));
        err
    }
}

pub struct WorkflowController {
    api: Arc<dyn EventsApi>,
    state: Mutex<ControllerState>,
    attached: AtomicBool,
}

impl WorkflowController {
    pub fn new(api: Arc<dyn EventsApi>) -> Self {
        Self {
            api,
            state: Mutex::new(ControllerState::default()),
            attached: AtomicBool::new(true),
        }
    }

    /// Mount-time load of the catalog.
    pub async fn initialize(&self) -> Result<usize, ControllerError> {
        self.load_events().await
    }

    pub async fn reload(&self) -> Result<usize, ControllerError> {
        self.load_events().await
    }

    // Overlapping loads are not de-duplicated: whichever response lands last
    // owns the catalog and the load state.
    async fn load_events(&self) -> Result<usize, ControllerError> {
        let load = {
            let mut state = self.state.lock().await;
            state.loads_issued += 1;
            state.load_state = LoadState::Loading;
            state.loads_issued
        };
        debug!(load, "events: loading catalog");

        let result = self.api.list_events().await;

        let mut state = self.state.lock().await;
        if !self.is_attached() {
            debug!(load, "events: dropping catalog response after detach");
            return Err(ControllerError::Detached);
        }

        match result {
            Ok(events) => {
                let count = events.len();
                state.catalog.replace(events);
                state.load_state = LoadState::Loaded;
                state.last_error = None;

                let selection_gone = state
                    .detail_modal
                    .payload()
                    .is_some_and(|id| !state.catalog.contains(id));
                if selection_gone {
                    state.detail_modal = Modal::Closed;
                }

                info!(load, count, "events: catalog loaded");
                Ok(count)
            }
            Err(err) => {
                state.load_state = LoadState::Failed;
                Err(state.record_failure(UiErrorContext::LoadEvents, err.into()))
            }
        }
    }

    pub async fn open_create(&self) {
        self.state.lock().await.create_modal = Modal::Open(());
    }

    pub async fn cancel(&self) {
        let mut state = self.state.lock().await;
        state.close_modals();
        state.last_error = None;
    }

    pub async fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.state.lock().await.form.set(field, value.into());
    }

    /// Sends the form to the server and appends the created event.
    ///
    /// The appended event's `creator_id` comes from `session`, not from the
    /// server. It must match the identity behind the bearer token sent with
    /// the request; the server remains authoritative at the next reload.
    ///
    /// On failure the create modal and the typed fields are kept.
    pub async fn submit_create(&self, session: &Session) -> Result<Event, ControllerError> {
        let Some(token) = session.bearer_token() else {
            let mut state = self.state.lock().await;
            return Err(state.record_failure(
                UiErrorContext::CreateEvent,
                ControllerError::Unauthenticated {
                    operation: "create event",
                },
            ));
        };

        let input = self.state.lock().await.form.to_variables();
        debug!(title = %input.title, price = ?input.price, "events: submitting new event");

        let result = self.api.create_event(token, &input).await;

        let mut state = self.state.lock().await;
        if !self.is_attached() {
            debug!("events: dropping create response after detach");
            return Err(ControllerError::Detached);
        }

        match result {
            Ok(created) => {
                let event = Event {
                    creator_id: session.user_id.clone(),
                    ..created
                };
                if !state.catalog.append(event.clone()) {
                    debug!(event_id = %event.id, "events: created event already in catalog");
                }
                state.create_modal = Modal::Closed;
                state.form.clear();
                state.last_error = None;
                info!(event_id = %event.id, "events: event created");
                Ok(event)
            }
            Err(err) => Err(state.record_failure(UiErrorContext::CreateEvent, err.into())),
        }
    }

    /// Opens the detail modal when `event_id` is in the catalog. A miss is
    /// silent and leaves the modal as it was.
    pub async fn select_event(&self, event_id: &EventId) -> bool {
        let mut state = self.state.lock().await;
        if !state.catalog.contains(event_id) {
            debug!(event_id = %event_id, "events: selection miss");
            return false;
        }
        state.detail_modal = Modal::Open(event_id.clone());
        true
    }

    /// Books the event shown in the detail modal. The catalog is never
    /// touched; success closes the modals if they still show this event.
    pub async fn book_selected(&self, session: &Session) -> Result<Booking, ControllerError> {
        let selected = self.state.lock().await.detail_modal.payload().cloned();
        let Some(event_id) = selected else {
            let mut state = self.state.lock().await;
            return Err(state.record_failure(UiErrorContext::BookEvent, ControllerError::NoSelection));
        };
        let Some(token) = session.bearer_token() else {
            let mut state = self.state.lock().await;
            return Err(state.record_failure(
                UiErrorContext::BookEvent,
                ControllerError::Unauthenticated {
                    operation: "book event",
                },
            ));
        };

        let result = self.api.book_event(token, &event_id).await;

        let mut state = self.state.lock().await;
        if !self.is_attached() {
            debug!(event_id = %event_id, "events: dropping booking response after detach");
            return Err(ControllerError::Detached);
        }

        match result {
            Ok(booking) => {
                if state.detail_modal.payload() == Some(&event_id) {
                    state.close_modals();
                } else {
                    debug!(event_id = %event_id, "events: selection changed while booking");
                }
                state.last_error = None;
                info!(event_id = %event_id, "events: event booked");
                Ok(booking)
            }
            Err(err) => Err(state.record_failure(UiErrorContext::BookEvent, err.into())),
        }
    }

    pub async fn view(&self, session: &Session) -> EventsView {
        let state = self.state.lock().await;
        let selected_event = state
            .detail_modal
            .payload()
            .and_then(|id| state.catalog.get(id))
            .cloned();
        let authenticated = session.is_authenticated();

        EventsView {
            load_state: state.load_state,
            is_loading: state.load_state == LoadState::Loading,
            events: state.catalog.snapshot(),
            creating: state.create_modal.is_open(),
            can_book: authenticated && selected_event.is_some(),
            selected_event,
            form: state.form.clone(),
            last_error: state.last_error.clone(),
            can_create: authenticated,
        }
    }

    pub async fn load_state(&self) -> LoadState {
        self.state.lock().await.load_state
    }

    pub async fn create_modal(&self) -> Modal<()> {
        self.state.lock().await.create_modal.clone()
    }

    pub async fn detail_modal(&self) -> Modal<EventId> {
        self.state.lock().await.detail_modal.clone()
    }

    /// Tears the controller down. Responses still in flight are dropped
    /// instead of merged.
    pub fn detach(&self) {
        if self.attached.swap(false, Ordering::SeqCst) {
            info!("events: controller detached");
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
