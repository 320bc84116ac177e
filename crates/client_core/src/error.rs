//! Transport/controller errors and their UI-facing classification.

use shared::error::{ErrorCode, GraphqlError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server rejected request: {}", join_messages(.0))]
    Server(Vec<GraphqlError>),
    #[error("server response carried no data")]
    MissingData,
    #[error("malformed server response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn join_messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|err| err.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ApiError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }

    /// The most specific code among the server's errors, if any were returned.
    pub fn server_code(&self) -> Option<ErrorCode> {
        let Self::Server(errors) = self else {
            return None;
        };
        let codes: Vec<ErrorCode> = errors.iter().map(GraphqlError::code).collect();
        [
            ErrorCode::Unauthenticated,
            ErrorCode::Forbidden,
            ErrorCode::Validation,
            ErrorCode::NotFound,
            ErrorCode::Internal,
        ]
        .into_iter()
        .find(|code| codes.contains(code))
        .or(Some(ErrorCode::Unknown))
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("{operation} requires a signed-in session")]
    Unauthenticated { operation: &'static str },
    #[error("no event is selected")]
    NoSelection,
    #[error("controller was detached before the response arrived")]
    Detached,
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Server,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    LoadEvents,
    CreateEvent,
    BookEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_error(context: UiErrorContext, err: &ControllerError) -> Self {
        let category = match err {
            ControllerError::Unauthenticated { .. } => UiErrorCategory::Auth,
            ControllerError::NoSelection => UiErrorCategory::Validation,
            ControllerError::Detached => UiErrorCategory::Unknown,
            ControllerError::Api(ApiError::Status { status, .. })
                if *status == 401 || *status == 403 =>
            {
                UiErrorCategory::Auth
            }
            ControllerError::Api(api) if api.is_transport() => UiErrorCategory::Transport,
            ControllerError::Api(api) => match api.server_code() {
                Some(ErrorCode::Unauthenticated) | Some(ErrorCode::Forbidden) => {
                    UiErrorCategory::Auth
                }
                Some(ErrorCode::Validation) => UiErrorCategory::Validation,
                _ => UiErrorCategory::Server,
            },
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_server_error_requires_reauth() {
        let err = ControllerError::Api(ApiError::Server(vec![GraphqlError::new(
            "Unauthenticated!",
        )]));
        let ui = UiError::from_error(UiErrorContext::CreateEvent, &err);
        assert_eq!(ui.category(), UiErrorCategory::Auth);
        assert!(ui.requires_reauth());
        assert_eq!(ui.context(), UiErrorContext::CreateEvent);
        assert!(ui.message().contains("Unauthenticated!"));
    }

    #[test]
    fn http_status_failures_are_transport_unless_auth() {
        let unavailable = ControllerError::Api(ApiError::Status {
            status: 503,
            body: "down".to_string(),
        });
        assert_eq!(
            UiError::from_error(UiErrorContext::LoadEvents, &unavailable).category(),
            UiErrorCategory::Transport
        );

        let forbidden = ControllerError::Api(ApiError::Status {
            status: 401,
            body: String::new(),
        });
        assert_eq!(
            UiError::from_error(UiErrorContext::BookEvent, &forbidden).category(),
            UiErrorCategory::Auth
        );
    }

    #[test]
    fn server_code_prefers_auth_over_other_errors() {
        let err = ApiError::Server(vec![
            GraphqlError::new("boom"),
            GraphqlError::new("nope").with_code("UNAUTHENTICATED"),
        ]);
        assert_eq!(err.server_code(), Some(ErrorCode::Unauthenticated));
        assert_eq!(
            ApiError::Server(vec![GraphqlError::new("boom")]).server_code(),
            Some(ErrorCode::Unknown)
        );
        assert_eq!(ApiError::MissingData.server_code(), None);
    }

    #[test]
    fn local_failures_classify_without_network() {
        let ui = UiError::from_error(
            UiErrorContext::BookEvent,
            &ControllerError::Unauthenticated {
                operation: "book event",
            },
        );
        assert_eq!(ui.category(), UiErrorCategory::Auth);
        assert_eq!(ui.message(), "book event requires a signed-in session");

        let ui = UiError::from_error(UiErrorContext::BookEvent, &ControllerError::NoSelection);
        assert_eq!(ui.category(), UiErrorCategory::Validation);
    }
}
