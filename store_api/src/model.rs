//! Store record exchanged over the wire and kept in the registry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single store.
///
/// Only `name` is interpreted by the service. Any other members of the JSON
/// object are kept in `attributes` and echoed back exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub name: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Store {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Substring match on `name`; an empty filter matches every store.
    pub fn matches(&self, filter: &str) -> bool {
        self.name.contains(filter)
    }
}
