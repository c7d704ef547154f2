//! In-memory store registry guarded by a single reader-writer lock.
//!
//! Lookups and listings take the lock in shared mode, creation takes it
//! exclusively. Guards are scoped to the map access itself, so no lock is
//! ever held across an `.await` or any I/O.

use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{error::RegistryError, model::Store};

/// Keyed collection of stores, identified by generated UUID strings.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: RwLock<HashMap<String, Store>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Every store whose name contains `filter`, in no particular order.
    #[instrument(skip(self))]
    pub fn list(&self, filter: &str) -> Vec<Store> {
        let stores = self.stores.read();
        let matched: Vec<Store> = stores
            .values()
            .filter(|store| store.matches(filter))
            .cloned()
            .collect();

        debug!("Listed {} of {} stores", matched.len(), stores.len());
        matched
    }

    /// Insert a copy of `store` under a freshly generated id.
    ///
    /// Ids are random v4 UUIDs; collisions are not checked for.
    #[instrument(skip(self, store), fields(name = %store.name))]
    pub fn create(&self, store: Store) -> (String, Store) {
        let mut stores = self.stores.write();
        let id = Uuid::new_v4().to_string();
        stores.insert(id.clone(), store.clone());

        debug!("Created store {}", id);
        (id, store)
    }

    #[instrument(skip(self))]
    pub fn read(&self, id: &str) -> Result<Store, RegistryError> {
        self.stores
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    pub fn len(&self) -> usize {
        self.stores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.read().is_empty()
    }
}
