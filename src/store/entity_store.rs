use parking_lot::Mutex;

use crate::models::Entity;

// ============================================================================
// Generic Entity Store
// ============================================================================
//
// Ordered, mutable sequence of one entity kind behind a mutex.
//
// Responsibilities:
// 1. Linear lookup by identifier (first match wins)
// 2. Snapshot of the whole sequence in insertion order
// 3. Append without uniqueness checks
// 4. Removal of the first matching element
//
// The lock is held only for the scan, append or removal. Callers get
// clones and serialize outside the critical section.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No entity with identifier {0}")]
    IdentifierNotFound(u64),
}

pub struct EntityStore<E: Entity> {
    entities: Mutex<Vec<E>>,
}

impl<E: Entity> EntityStore<E> {
    pub fn with_seed(seed: Vec<E>) -> Self {
        Self {
            entities: Mutex::new(seed),
        }
    }

    /// First entity whose identifier equals `id`
    pub fn get(&self, id: u64) -> Result<E, StoreError> {
        self.entities
            .lock()
            .iter()
            .find(|entity| entity.id() == id)
            .cloned()
            .ok_or(StoreError::IdentifierNotFound(id))
    }

    /// Snapshot of the store in insertion order
    pub fn list(&self) -> Vec<E> {
        self.entities.lock().clone()
    }

    /// Append to the end. Duplicate identifiers are accepted.
    pub fn insert(&self, entity: E) {
        self.entities.lock().push(entity);
    }

    /// Remove the first entity whose identifier equals `id`
    pub fn remove(&self, id: u64) -> Result<E, StoreError> {
        let mut entities = self.entities.lock();
        let position = entities
            .iter()
            .position(|entity| entity.id() == id)
            .ok_or(StoreError::IdentifierNotFound(id))?;
        Ok(entities.remove(position))
    }

    pub fn len(&self) -> usize {
        self.entities.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
