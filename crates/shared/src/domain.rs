use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(EventId);
id_newtype!(UserId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// ISO-8601 text exactly as the server returned it.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<UserId>,
}

impl Event {
    /// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&self.date) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn is_created_by(&self, user_id: &UserId) -> bool {
        self.creator_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub event_title: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Identity handed to the controller by whatever owns authentication.
/// A missing or blank token means the caller is anonymous.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user_id: Option<UserId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: impl Into<String>, user_id: impl Into<UserId>) -> Self {
        Self {
            token: Some(token.into()),
            user_id: Some(user_id.into()),
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer_token().is_some()
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_dated(date: &str) -> Event {
        Event {
            id: EventId::new("e1"),
            title: "Meetup".to_string(),
            description: "desc".to_string(),
            price: 12.5,
            date: date.to_string(),
            creator_id: Some(UserId::new("u1")),
        }
    }

    #[test]
    fn starts_at_parses_rfc3339_and_plain_dates() {
        let timestamp = event_dated("2024-01-01T18:30:00.000Z")
            .starts_at()
            .expect("rfc3339");
        assert_eq!(timestamp.to_rfc3339(), "2024-01-01T18:30:00+00:00");

        let midnight = event_dated("2024-01-01").starts_at().expect("plain date");
        assert_eq!(midnight.to_rfc3339(), "2024-01-01T00:00:00+00:00");

        assert!(event_dated("next friday").starts_at().is_none());
    }

    #[test]
    fn blank_token_is_anonymous() {
        let session = Session {
            token: Some("   ".to_string()),
            user_id: Some(UserId::new("u1")),
        };
        assert!(!session.is_authenticated());
        assert!(Session::authenticated("tok", "u1").is_authenticated());
        assert!(!Session::anonymous().is_authenticated());
    }

    #[test]
    fn creator_match_requires_same_user() {
        let event = event_dated("2024-01-01");
        assert!(event.is_created_by(&UserId::new("u1")));
        assert!(!event.is_created_by(&UserId::new("u2")));
    }
}
