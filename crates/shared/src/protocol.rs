use serde::{Deserialize, Serialize};

use crate::{
    domain::{Booking, Event, EventId, UserId},
    error::GraphqlError,
};

pub const LIST_EVENTS_QUERY: &str = r#"
  query {
    events {
      _id
      title
      description
      price
      date
      creator {
        _id
      }
    }
  }
"#;

pub const CREATE_EVENT_MUTATION: &str = r#"
  mutation CreateEvent($title: String!, $desc: String!, $price: Float!, $date: String!) {
    createEvent(eventInput: { title: $title, description: $desc, price: $price, date: $date }) {
      _id
      title
      description
      price
      date
    }
  }
"#;

pub const BOOK_EVENT_MUTATION: &str = r#"
  mutation BookEvent($id: ID!) {
    bookEvent(eventId: $id) {
      event {
        title
      }
      createdAt
      updatedAt
    }
  }
"#;

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<V>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphqlError>>,
}

/// `price` is `None` when the form text was not a finite number; it is sent
/// as `null` and left for the server to reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventVariables {
    pub title: String,
    pub desc: String,
    pub price: Option<f64>,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEventVariables {
    pub id: EventId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatorNode {
    #[serde(rename = "_id")]
    pub id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventNode {
    #[serde(rename = "_id")]
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<CreatorNode>,
}

impl From<EventNode> for Event {
    fn from(node: EventNode) -> Self {
        Self {
            id: node.id,
            title: node.title,
            description: node.description,
            price: node.price,
            date: node.date,
            creator_id: node.creator.map(|creator| creator.id),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventsData {
    pub events: Vec<EventNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventData {
    #[serde(rename = "createEvent")]
    pub create_event: EventNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookedEventNode {
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookingNode {
    pub event: BookedEventNode,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl From<BookingNode> for Booking {
    fn from(node: BookingNode) -> Self {
        Self {
            event_title: node.event.title,
            created_at: node.created_at,
            updated_at: node.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookEventData {
    #[serde(rename = "bookEvent")]
    pub book_event: BookingNode,
}
