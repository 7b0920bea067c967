// ============================================================================
// Entity Store - In-Memory Persistence
// ============================================================================
//
// One store per entity kind, generic over `Entity`.
// Stores live for the life of the process and are never written to disk.
//
// ============================================================================

pub mod entity_store;

pub use entity_store::{EntityStore, StoreError};
