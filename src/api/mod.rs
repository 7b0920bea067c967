// ============================================================================
// HTTP API
// ============================================================================
//
// - crud/   - generic entity store router
// - error/  - router error to status mapping
// - routes/ - application state and route table
//
// ============================================================================

pub mod crud;
pub mod error;
pub mod routes;

pub use routes::{configure, AppState};
