use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Unauthenticated,
    Forbidden,
    NotFound,
    Validation,
    Internal,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: u32,
    pub column: u32,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct GraphqlError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Value>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions = Some(serde_json::json!({ "code": code }));
        self
    }

    /// Prefers `extensions.code`; servers that only throw plain errors
    /// (`"Unauthenticated!"`) are classified from the message text.
    pub fn code(&self) -> ErrorCode {
        let extension_code = self
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(|code| code.as_str());

        match extension_code {
            Some("UNAUTHENTICATED") => return ErrorCode::Unauthenticated,
            Some("FORBIDDEN") => return ErrorCode::Forbidden,
            Some("NOT_FOUND") => return ErrorCode::NotFound,
            Some("BAD_USER_INPUT") | Some("GRAPHQL_VALIDATION_FAILED") => {
                return ErrorCode::Validation
            }
            Some("INTERNAL_SERVER_ERROR") => return ErrorCode::Internal,
            _ => {}
        }

        let lower = self.message.to_ascii_lowercase();
        if lower.contains("unauthenticated") || lower.contains("unauthorized") {
            ErrorCode::Unauthenticated
        } else if lower.contains("forbidden") {
            ErrorCode::Forbidden
        } else if lower.contains("not found") {
            ErrorCode::NotFound
        } else if lower.contains("invalid value")
            || lower.contains("expected type")
            || lower.contains("cannot represent")
            || lower.contains("non-nullable")
        {
            ErrorCode::Validation
        } else {
            ErrorCode::Unknown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_code_wins_over_message_text() {
        let err = GraphqlError::new("something broke").with_code("UNAUTHENTICATED");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }

    #[test]
    fn classifies_plain_server_messages() {
        assert_eq!(
            GraphqlError::new("Unauthenticated!").code(),
            ErrorCode::Unauthenticated
        );
        assert_eq!(
            GraphqlError::new(
                "Variable \"$price\" got invalid value null; Expected non-nullable type \"Float!\" not to be null."
            )
            .code(),
            ErrorCode::Validation
        );
        assert_eq!(GraphqlError::new("boom").code(), ErrorCode::Unknown);
    }

    #[test]
    fn deserializes_error_entry_with_locations() {
        let err: GraphqlError = serde_json::from_str(
            r#"{"message":"Event not found","locations":[{"line":2,"column":3}],"path":["bookEvent"]}"#,
        )
        .expect("error entry");
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.locations.expect("locations")[0].line, 2);
    }
}
