use crate::errors::GigzError;
use crate::structs::{Category, Gig, Order};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

/// Entities kept in a `Collection`, keyed by their server-assigned id.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Gig {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Order {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Observable, insertion-ordered list of entities.
///
/// Every patch is one `send_modify` step, so subscribers never observe a half-applied mutation.
/// Patches are applied in the order they are called; nothing here orders overlapping requests.
#[derive(Debug)]
pub struct Collection<T> {
    items: watch::Sender<Vec<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: watch::Sender::new(Vec::new()),
        }
    }
}

impl<T: Identified + Clone> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receiver that sees every change to the list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.items.subscribe()
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn find(&self, id: &str) -> Option<T> {
        self.items.borrow().iter().find(|item| item.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.borrow().iter().any(|item| item.id() == id)
    }

    pub fn replace_all(&self, items: Vec<T>) {
        self.items.send_replace(items);
    }

    pub fn push(&self, item: T) {
        self.items.send_modify(|items| items.push(item));
    }

    /// Replaces the entity stored under `id`, keeping its position. Returns whether it was present.
    pub fn replace(&self, id: &str, item: T) -> bool {
        self.items.send_if_modified(|items| {
            match items.iter_mut().find(|slot| slot.id() == id) {
                Some(slot) => {
                    *slot = item;
                    true
                }
                None => false,
            }
        })
    }

    /// Removes the entity with `id`. Returns whether it was present.
    pub fn remove(&self, id: &str) -> bool {
        self.items.send_if_modified(|items| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            items.len() != before
        })
    }
}

/// Decodes a list response. A body that is not a JSON array counts as an empty list.
pub fn decode_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>, GigzError> {
    match body {
        Value::Array(_) => serde_json::from_value(body).or(Err(GigzError::FailedToDecode)),
        other => {
            tracing::debug!("expected a list response, got {}; treating as empty", kind(&other));
            Ok(Vec::new())
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.into(),
            name: name.into(),
            gigs: Vec::new(),
        }
    }

    #[test]
    fn replace_keeps_position() {
        let collection = Collection::new();
        collection.push(category("1", "Design"));
        collection.push(category("2", "Writing"));
        collection.push(category("3", "Music"));

        assert!(collection.replace("2", category("2", "Copywriting")));
        let names: Vec<_> = collection.snapshot().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Design", "Copywriting", "Music"]);

        assert!(!collection.replace("9", category("9", "Nope")));
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn remove_reports_membership() {
        let collection = Collection::new();
        collection.push(category("1", "Design"));
        assert!(collection.remove("1"));
        assert!(!collection.remove("1"));
        assert!(collection.is_empty());
    }

    #[test]
    fn subscribers_see_changes() {
        let collection = Collection::new();
        let mut rx = collection.subscribe();
        assert!(!rx.has_changed().unwrap());

        collection.push(category("1", "Design"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        // no-op removal does not notify
        collection.remove("missing");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn non_list_bodies_decode_as_empty() {
        let items: Vec<Category> = decode_list(json!({"message": "oops"})).unwrap();
        assert!(items.is_empty());
        let items: Vec<Category> = decode_list(Value::Null).unwrap();
        assert!(items.is_empty());

        let items: Vec<Category> = decode_list(json!([{"id": "1", "name": "Design"}])).unwrap();
        assert_eq!(items, vec![category("1", "Design")]);

        let bad: Result<Vec<Category>, _> = decode_list(json!([{"nope": true}]));
        assert!(matches!(bad, Err(GigzError::FailedToDecode)));
    }
}
