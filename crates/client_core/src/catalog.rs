use shared::domain::{Event, EventId};

/// Ordered event collection; order is arrival order (load order, then
/// append order for locally created events).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCatalog {
    events: Vec<Event>,
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    /// Returns `false` without touching the catalog when the id is already
    /// present, e.g. a reload that raced the create response.
    pub fn append(&mut self, event: Event) -> bool {
        if self.contains(&event.id) {
            return false;
        }
        self.events.push(event);
        true
    }

    pub fn get(&self, id: &EventId) -> Option<&Event> {
        self.events.iter().find(|event| &event.id == id)
    }

    pub fn contains(&self, id: &EventId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str) -> Event {
        Event {
            id: EventId::new(id),
            title: format!("event {id}"),
            description: String::new(),
            price: 1.0,
            date: "2024-01-01".to_string(),
            creator_id: None,
        }
    }

    #[test]
    fn replace_then_append_keeps_arrival_order() {
        let mut catalog = EventCatalog::new();
        catalog.replace(vec![event("b"), event("a")]);
        assert!(catalog.append(event("c")));

        let ids: Vec<&str> = catalog.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn append_skips_known_ids() {
        let mut catalog = EventCatalog::new();
        catalog.replace(vec![event("a")]);
        let mut duplicate = event("a");
        duplicate.title = "changed".to_string();

        assert!(!catalog.append(duplicate));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(&EventId::new("a")).expect("a").title, "event a");
    }

    #[test]
    fn replace_drops_previous_contents() {
        let mut catalog = EventCatalog::new();
        catalog.replace(vec![event("a"), event("b")]);
        catalog.replace(Vec::new());
        assert!(catalog.is_empty());
        assert!(!catalog.contains(&EventId::new("a")));
    }
}
