//! In-process collection backend used by the demo and the tests.
//!
//! Stores JSON objects per collection, assigns ids on POST and answers
//! parent/child queries through a registered foreign key. It applies no
//! business rules: whatever is posted is stored.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::{Map, Value};

use crate::error::TransportError;
use crate::remote::RemoteCollection;

/// A request seen by [`MemoryRemote`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get(String),
    Post(String, Value),
    Put(String, Value),
    Delete(String),
}

impl Call {
    pub fn method(&self) -> &'static str {
        match self {
            Call::Get(_) => "GET",
            Call::Post(..) => "POST",
            Call::Put(..) => "PUT",
            Call::Delete(_) => "DELETE",
        }
    }
}

/// One stored collection, e.g. `/flights` keyed by `flightId`
struct Collection {
    id_field: String,                 // JSON field holding the server id
    next_id: i64,                     // Next id handed out on POST
    records: BTreeMap<i64, Value>,    // Records in id order
}

/// Child collection reachable from a parent, e.g. `/flights/{id}/passengers`
struct Link {
    child: String,        // Child collection path
    foreign_key: String,  // Field on the child naming the parent id
}

#[derive(Default)]
struct Store {
    collections: HashMap<String, Collection>,
    links: HashMap<String, Link>,
    calls: Vec<Call>,
    failures: VecDeque<TransportError>,
}

/// In-memory [`RemoteCollection`]
#[derive(Default)]
pub struct MemoryRemote {
    store: RefCell<Store>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend with `/flights` and `/passengers` linked through `flightId`
    pub fn booking() -> Self {
        let remote = Self::new();
        remote.add_collection("/flights", "flightId");
        remote.add_collection("/passengers", "passengerId");
        remote.link("/flights", "/passengers", "flightId");
        remote
    }

    pub fn add_collection(&self, path: &str, id_field: &str) {
        self.store.borrow_mut().collections.insert(
            path.to_string(),
            Collection {
                id_field: id_field.to_string(),
                next_id: 1,
                records: BTreeMap::new(),
            },
        );
    }

    /// Makes `{parent}/{id}{child}` list the children whose `foreign_key` is `id`
    pub fn link(&self, parent: &str, child: &str, foreign_key: &str) {
        self.store.borrow_mut().links.insert(
            parent.to_string(),
            Link {
                child: child.to_string(),
                foreign_key: foreign_key.to_string(),
            },
        );
    }

    /// Stores a record directly, without logging a call; returns its id
    pub fn seed(&self, path: &str, record: Value) -> i64 {
        let mut store = self.store.borrow_mut();
        match store.collections.get_mut(path) {
            Some(collection) => insert(collection, record),
            None => 0,
        }
    }

    /// Makes the next request fail with `err`
    pub fn fail_next(&self, err: TransportError) {
        self.store.borrow_mut().failures.push_back(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.store.borrow().calls.clone()
    }

    /// Number of logged calls using `method` ("GET", "POST", ...)
    pub fn count(&self, method: &str) -> usize {
        self.store
            .borrow()
            .calls
            .iter()
            .filter(|call| call.method() == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.store.borrow_mut().calls.clear();
    }

    /// Logs the call and pops a scripted failure, if one is queued
    fn begin(&self, call: Call) -> Result<(), TransportError> {
        let mut store = self.store.borrow_mut();
        store.calls.push(call);
        match store.failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Splits `/flights/3` into (`/flights`, Some(3)) and `/flights` into (`/flights`, None)
fn split_path(path: &str) -> (&str, Option<i64>) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((base, last)) if !base.is_empty() => match last.parse::<i64>() {
            Ok(id) => (base, Some(id)),
            Err(_) => (trimmed, None),
        },
        _ => (trimmed, None),
    }
}

fn not_found(what: &str) -> TransportError {
    TransportError::from_status(404, &format!("{} not found", what))
}

/// Singular label for a collection path: `/flights` -> `Flight`
fn label(path: &str) -> String {
    let name = path.trim_start_matches('/').trim_end_matches('s');
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Record".to_string(),
    }
}

fn insert(collection: &mut Collection, mut record: Value) -> i64 {
    let id = collection.next_id;
    collection.next_id += 1;
    if let Value::Object(map) = &mut record {
        map.insert(collection.id_field.clone(), Value::from(id));
    }
    collection.records.insert(id, record);
    id
}

fn as_object(body: &Value) -> Result<Map<String, Value>, TransportError> {
    body.as_object()
        .cloned()
        .ok_or_else(|| TransportError::from_status(400, "Request body must be a JSON object"))
}

impl RemoteCollection for MemoryRemote {
    fn get(&self, path: &str) -> Result<Value, TransportError> {
        self.begin(Call::Get(path.to_string()))?;
        let store = self.store.borrow();

        // `/parents/{id}/children`
        for (parent, link) in &store.links {
            let prefix = format!("{}/", parent);
            if let Some(rest) = path.strip_prefix(&prefix) {
                if let Some(id_text) = rest.strip_suffix(link.child.as_str()) {
                    if let Ok(parent_id) = id_text.parse::<i64>() {
                        let parents = store
                            .collections
                            .get(parent)
                            .ok_or_else(|| not_found(parent))?;
                        if !parents.records.contains_key(&parent_id) {
                            return Err(not_found(&label(parent)));
                        }
                        let children = store
                            .collections
                            .get(&link.child)
                            .ok_or_else(|| not_found(&link.child))?;
                        let matching = children
                            .records
                            .values()
                            .filter(|child| {
                                child.get(&link.foreign_key) == Some(&Value::from(parent_id))
                            })
                            .cloned()
                            .collect();
                        return Ok(Value::Array(matching));
                    }
                }
            }
        }

        let (base, id) = split_path(path);
        let collection = store.collections.get(base).ok_or_else(|| not_found(base))?;
        match id {
            None => Ok(Value::Array(collection.records.values().cloned().collect())),
            Some(id) => collection
                .records
                .get(&id)
                .cloned()
                .ok_or_else(|| not_found(&label(base))),
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.begin(Call::Post(path.to_string(), body.clone()))?;
        let record = Value::Object(as_object(body)?);
        let mut store = self.store.borrow_mut();
        let collection = store.collections.get_mut(path).ok_or_else(|| not_found(path))?;
        let id = insert(collection, record);
        Ok(collection.records[&id].clone())
    }

    fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.begin(Call::Put(path.to_string(), body.clone()))?;
        let mut fields = as_object(body)?;
        let (base, id) = split_path(path);
        let id = id.ok_or_else(|| TransportError::from_status(405, "PUT requires a record id"))?;

        let mut store = self.store.borrow_mut();
        let collection = store.collections.get_mut(base).ok_or_else(|| not_found(base))?;
        let id_field = collection.id_field.clone();
        let stored = collection
            .records
            .get_mut(&id)
            .ok_or_else(|| not_found(&label(base)))?;

        fields.insert(id_field, Value::from(id));
        if let Value::Object(existing) = &mut *stored {
            existing.extend(fields);
        }
        Ok(stored.clone())
    }

    fn delete(&self, path: &str) -> Result<(), TransportError> {
        self.begin(Call::Delete(path.to_string()))?;
        let (base, id) = split_path(path);
        let id = id.ok_or_else(|| TransportError::from_status(405, "DELETE requires a record id"))?;
        let mut store = self.store.borrow_mut();
        let collection = store.collections.get_mut(base).ok_or_else(|| not_found(base))?;
        collection
            .records
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(&label(base)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_assigns_sequential_ids() {
        let remote = MemoryRemote::booking();
        let first = remote.post("/flights", &json!({"airline": "KLM"})).unwrap();
        let second = remote.post("/flights", &json!({"airline": "SAS"})).unwrap();
        assert_eq!(first["flightId"], 1);
        assert_eq!(second["flightId"], 2);
        assert_eq!(remote.count("POST"), 2);
    }

    #[test]
    fn get_item_and_missing_item() {
        let remote = MemoryRemote::booking();
        let id = remote.seed("/flights", json!({"airline": "KLM"}));
        assert_eq!(remote.get(&format!("/flights/{}", id)).unwrap()["airline"], "KLM");

        let err = remote.get("/flights/99").unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Flight not found");
    }

    #[test]
    fn children_follow_the_foreign_key() {
        let remote = MemoryRemote::booking();
        let a = remote.seed("/flights", json!({"airline": "KLM"}));
        let b = remote.seed("/flights", json!({"airline": "SAS"}));
        remote.seed("/passengers", json!({"firstName": "Ann", "flightId": a}));
        remote.seed("/passengers", json!({"firstName": "Bo", "flightId": b}));
        remote.seed("/passengers", json!({"firstName": "Cy", "flightId": a}));

        let children = remote.get_child_of("/flights", a, "/passengers").unwrap();
        let names: Vec<_> = children
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["firstName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Ann", "Cy"]);
        assert_eq!(remote.calls(), vec![Call::Get(format!("/flights/{}/passengers", a))]);
    }

    #[test]
    fn put_merges_and_keeps_id() {
        let remote = MemoryRemote::booking();
        let id = remote.seed("/flights", json!({"airline": "KLM", "price": 10.0}));
        let updated = remote
            .put(&format!("/flights/{}", id), &json!({"price": 12.5, "flightId": 777}))
            .unwrap();
        assert_eq!(updated["flightId"], id);
        assert_eq!(updated["airline"], "KLM");
        assert_eq!(updated["price"], 12.5);
    }

    #[test]
    fn scripted_failure_is_consumed_once() {
        let remote = MemoryRemote::booking();
        remote.fail_next(TransportError::Network("down".into()));
        assert!(remote.get("/flights").is_err());
        assert!(remote.get("/flights").is_ok());
        assert_eq!(remote.count("GET"), 2);
    }

    #[test]
    fn delete_removes_record() {
        let remote = MemoryRemote::booking();
        let id = remote.seed("/passengers", json!({"firstName": "Ann"}));
        remote.delete(&format!("/passengers/{}", id)).unwrap();
        assert_eq!(remote.get("/passengers").unwrap(), json!([]));
        assert!(remote.delete(&format!("/passengers/{}", id)).is_err());
    }
}
